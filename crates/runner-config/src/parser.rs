//! Configuration parser and conversion into job runner types

use crate::{
    CONFIG_VERSION, Config, ConfigError, Result, RunnerSettings,
    resolver::{ResolutionContext, resolve_opt},
};
use job_runner::{
    InjectionPoint, TaskAlias, TemplateCatalog, TemplateDescriptor, is_plain_file_name,
};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Parse a YAML configuration file
pub fn parse_file(path: impl AsRef<Path>) -> Result<Config> {
    let content = std::fs::read_to_string(path)?;
    parse_str(&content)
}

/// Parse YAML configuration from a string
pub fn parse_str(content: &str) -> Result<Config> {
    let config: Config = serde_yaml::from_str(content)?;
    validate_config(&config)?;
    Ok(config)
}

/// Parse a file and resolve it against the process environment
///
/// Relative paths in the file are taken from the file's directory.
pub fn load_settings(path: impl AsRef<Path>) -> Result<RunnerSettings> {
    let path = path.as_ref();
    let config = parse_file(path)?;
    let base = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    };
    resolve_settings(&config, &base, &ResolutionContext::new())
}

/// Built-in tasks with the configured ones layered on top
pub fn merged_tasks(config: &Config) -> BTreeMap<String, TaskAlias> {
    let mut tasks = TaskAlias::defaults();
    for (name, spec) in &config.tasks {
        tasks.insert(
            name.clone(),
            TaskAlias::new(spec.template.clone(), spec.injection.clone()),
        );
    }
    tasks
}

/// Validate configuration
fn validate_config(config: &Config) -> Result<()> {
    if config.version != CONFIG_VERSION {
        return Err(ConfigError::ValidationError(format!(
            "Unsupported version: {}, expected {}",
            config.version, CONFIG_VERSION
        )));
    }

    if config.execution.script_timeout == Some(0) {
        return Err(ConfigError::ValidationError(
            "script_timeout must be at least 1 second".to_string(),
        ));
    }

    for key in config.templates.keys() {
        if !is_plain_file_name(key) {
            return Err(ConfigError::ValidationError(format!(
                "Template key '{}' must be a plain file name",
                key
            )));
        }
    }

    // Every task must target a point its template accepts
    for (name, task) in merged_tasks(config) {
        if !is_plain_file_name(&task.template) {
            return Err(ConfigError::ValidationError(format!(
                "Task '{}' references invalid template key '{}'",
                name, task.template
            )));
        }
        let descriptor = descriptor_for(config, &task.template);
        if descriptor.point(&task.injection).is_none() {
            return Err(ConfigError::ValidationError(format!(
                "Task '{}' injects '{}' which template '{}' does not declare",
                name, task.injection, task.template
            )));
        }
    }

    Ok(())
}

fn descriptor_for(config: &Config, key: &str) -> TemplateDescriptor {
    match config.templates.get(key) {
        Some(spec) => TemplateDescriptor::new(
            key,
            spec.injections
                .iter()
                .map(|(name, shape)| InjectionPoint::new(name.clone(), *shape))
                .collect(),
        ),
        None => TemplateDescriptor::standard(key),
    }
}

fn resolve_path(
    value: Option<&str>,
    base: &Path,
    context: &ResolutionContext,
) -> Result<Option<PathBuf>> {
    Ok(resolve_opt(value, context)?.map(|resolved| {
        let path = PathBuf::from(resolved);
        if path.is_absolute() {
            path
        } else {
            base.join(path)
        }
    }))
}

/// Convert a parsed configuration into job runner settings
///
/// Unset values take the conventional layout under `base`.
pub fn resolve_settings(
    config: &Config,
    base: &Path,
    context: &ResolutionContext,
) -> Result<RunnerSettings> {
    let mut runner = job_runner::RunnerConfig::rooted_at(base);
    let paths = &config.paths;

    if let Some(catalog) = resolve_path(paths.template_catalog.as_deref(), base, context)? {
        runner.template_catalog = catalog;
    }
    if let Some(runtime_dir) = resolve_path(paths.runtime_dir.as_deref(), base, context)? {
        runner.copies_dir = runtime_dir.join("copies");
        runner.logs_dir = runtime_dir.join("outputs");
        runner.runtime_dir = runtime_dir;
    }
    if let Some(copies_dir) = resolve_path(paths.copies_dir.as_deref(), base, context)? {
        runner.copies_dir = copies_dir;
    }
    if let Some(logs_dir) = resolve_path(paths.logs_dir.as_deref(), base, context)? {
        runner.logs_dir = logs_dir;
    }
    runner.driver_cache_dir = resolve_path(paths.driver_cache_dir.as_deref(), base, context)?;

    let execution = &config.execution;
    if let Some(interpreter) = resolve_opt(execution.interpreter.as_deref(), context)? {
        runner.interpreter = interpreter;
    }
    if let Some(seconds) = execution.script_timeout {
        runner.script_timeout = Duration::from_secs(seconds);
    }
    if let Some(patch_driver) = execution.patch_driver {
        runner.patch_driver = patch_driver;
    }

    let mut catalog = TemplateCatalog::new(&runner.template_catalog);
    for key in config.templates.keys() {
        catalog.insert_descriptor(descriptor_for(config, key));
    }

    Ok(RunnerSettings {
        runner,
        catalog,
        tasks: merged_tasks(config),
    })
}
