//! Environment variable resolver
//!
//! Resolves `${VAR}` and `${VAR:-default}` in path and interpreter settings.

use crate::{Config, ConfigError, Result};
use regex::Regex;
use std::collections::{BTreeSet, HashMap};
use std::sync::LazyLock;

static ENV_REF: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\$\{([^}]+)\}").expect("env reference pattern is valid"));

/// Context for resolving variables
#[derive(Debug, Clone)]
pub struct ResolutionContext {
    /// Environment variables (can be overridden)
    pub env_vars: HashMap<String, String>,
}

impl ResolutionContext {
    /// Create a context from the process environment
    pub fn new() -> Self {
        Self {
            env_vars: std::env::vars().collect(),
        }
    }

    /// Create a context with no variables at all
    pub fn empty() -> Self {
        Self {
            env_vars: HashMap::new(),
        }
    }

    /// Add or update an environment variable
    pub fn set_env(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.env_vars.insert(key.into(), value.into());
    }
}

impl Default for ResolutionContext {
    fn default() -> Self {
        Self::new()
    }
}

fn split_default(var_expr: &str) -> (&str, Option<&str>) {
    match var_expr.find(":-") {
        Some(pos) => (&var_expr[..pos], Some(&var_expr[pos + 2..])),
        None => (var_expr, None),
    }
}

/// Resolve all variables in a string
pub fn resolve_string(input: &str, context: &ResolutionContext) -> Result<String> {
    let mut result = input.to_string();
    let mut errors = Vec::new();

    for cap in ENV_REF.captures_iter(input) {
        let full_match = &cap[0];
        let (var_name, default_value) = split_default(&cap[1]);

        if let Some(value) = context.env_vars.get(var_name) {
            result = result.replace(full_match, value);
        } else if let Some(default) = default_value {
            result = result.replace(full_match, default);
        } else {
            errors.push(var_name.to_string());
        }
    }

    if !errors.is_empty() {
        return Err(ConfigError::EnvVarNotFound(errors.join(", ")));
    }

    Ok(result)
}

/// Resolve an optional setting
pub fn resolve_opt(input: Option<&str>, context: &ResolutionContext) -> Result<Option<String>> {
    input.map(|value| resolve_string(value, context)).transpose()
}

fn resolvable_fields(config: &Config) -> impl Iterator<Item = &str> {
    let paths = &config.paths;
    [
        paths.template_catalog.as_deref(),
        paths.runtime_dir.as_deref(),
        paths.copies_dir.as_deref(),
        paths.logs_dir.as_deref(),
        paths.driver_cache_dir.as_deref(),
        config.execution.interpreter.as_deref(),
    ]
    .into_iter()
    .flatten()
}

/// Find every variable a configuration refers to
pub fn find_env_references(config: &Config) -> BTreeSet<String> {
    let mut env_vars = BTreeSet::new();
    for value in resolvable_fields(config) {
        for cap in ENV_REF.captures_iter(value) {
            let (var_name, _) = split_default(&cap[1]);
            env_vars.insert(var_name.to_string());
        }
    }
    env_vars
}

/// Variables referenced without a default that the context does not define
pub fn missing_env_vars(config: &Config, context: &ResolutionContext) -> Vec<String> {
    let mut missing = BTreeSet::new();
    for value in resolvable_fields(config) {
        for cap in ENV_REF.captures_iter(value) {
            let (var_name, default_value) = split_default(&cap[1]);
            if default_value.is_none() && !context.env_vars.contains_key(var_name) {
                missing.insert(var_name.to_string());
            }
        }
    }
    missing.into_iter().collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn context() -> ResolutionContext {
        let mut context = ResolutionContext::empty();
        context.set_env("OPS_HOME", "/srv/ops");
        context.set_env("PY", "python3.11");
        context
    }

    #[test]
    fn test_resolve_env_vars() {
        let ctx = context();

        assert_eq!(resolve_string("${OPS_HOME}", &ctx).unwrap(), "/srv/ops");
        assert_eq!(
            resolve_string("${OPS_HOME}/scripts/originals", &ctx).unwrap(),
            "/srv/ops/scripts/originals"
        );
        assert_eq!(
            resolve_string("${MISSING:-runtime}", &ctx).unwrap(),
            "runtime"
        );
        assert_eq!(resolve_string("${PY:-ignored}", &ctx).unwrap(), "python3.11");
        assert_eq!(resolve_string("plain", &ctx).unwrap(), "plain");
    }

    #[test]
    fn test_missing_var_reported() {
        let err = resolve_string("${NOPE}/${ALSO_NOPE}", &context()).unwrap_err();
        match err {
            ConfigError::EnvVarNotFound(names) => assert_eq!(names, "NOPE, ALSO_NOPE"),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_find_references() {
        let yaml = r#"
version: "1.0"
paths:
  template_catalog: "${OPS_HOME}/scripts"
  runtime_dir: "${RUNTIME:-runtime}"
execution:
  interpreter: "${PY}"
"#;
        let config = crate::parser::parse_str(yaml).unwrap();

        let refs = find_env_references(&config);
        assert_eq!(
            refs.into_iter().collect::<Vec<_>>(),
            vec!["OPS_HOME", "PY", "RUNTIME"]
        );

        let mut ctx = ResolutionContext::empty();
        ctx.set_env("PY", "python3");
        assert_eq!(missing_env_vars(&config, &ctx), vec!["OPS_HOME"]);
    }
}
