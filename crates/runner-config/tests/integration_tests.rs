//! Integration tests for runner-config

use job_runner::ValueShape;
use runner_config::{
    Config, ConfigError, TaskSpec, load_settings, parse_file, parse_str,
    resolver::{ResolutionContext, find_env_references},
    resolve_settings,
};
use std::path::Path;
use std::time::Duration;

#[test]
fn test_full_config_parsing() {
    let yaml = r#"
version: "1.0"
name: "content-ops"

paths:
  template_catalog: "${OPS_HOME}/scripts/originals"
  runtime_dir: "${OPS_RUNTIME:-/var/lib/ops-runner}"
  driver_cache_dir: "/opt/drivers/chromedriver"

execution:
  interpreter: "/usr/bin/python3"
  script_timeout: 900
  patch_driver: false

templates:
  sheet_loading.py:
    injections:
      GOOGLE_SHEET_URL: text
  oldppt_to_newppt.py:
    injections:
      pairs: records
  bulk_tagging.py:
    injections:
      uuid_list: text_list
      TAG_SHEET: text

tasks:
  bulk-tagging:
    template: bulk_tagging.py
    injection: uuid_list
"#;

    let config = parse_str(yaml).unwrap();
    assert_eq!(config.name.as_deref(), Some("content-ops"));
    assert_eq!(config.templates.len(), 3);
    assert_eq!(
        config.templates["bulk_tagging.py"].injections["TAG_SHEET"],
        ValueShape::Text
    );
    assert_eq!(
        config.tasks["bulk-tagging"],
        TaskSpec {
            template: "bulk_tagging.py".to_string(),
            injection: "uuid_list".to_string(),
        }
    );

    let mut context = ResolutionContext::empty();
    context.set_env("OPS_HOME", "/srv/ops");
    let settings = resolve_settings(&config, Path::new("/etc/ops"), &context).unwrap();

    let runner = &settings.runner;
    assert_eq!(runner.template_catalog, Path::new("/srv/ops/scripts/originals"));
    assert_eq!(runner.runtime_dir, Path::new("/var/lib/ops-runner"));
    assert_eq!(runner.copies_dir, Path::new("/var/lib/ops-runner/copies"));
    assert_eq!(runner.logs_dir, Path::new("/var/lib/ops-runner/outputs"));
    assert_eq!(
        runner.driver_cache_dir.as_deref(),
        Some(Path::new("/opt/drivers/chromedriver"))
    );
    assert_eq!(runner.interpreter, "/usr/bin/python3");
    assert_eq!(runner.script_timeout, Duration::from_secs(900));
    assert!(!runner.patch_driver);

    // Built-in tasks plus the configured one
    assert_eq!(settings.tasks.len(), 8);
    assert_eq!(settings.tasks["bulk-tagging"].template, "bulk_tagging.py");
    assert_eq!(settings.tasks["sheet-loading"].injection, "GOOGLE_SHEET_URL");

    let descriptor = settings.catalog.descriptor("oldppt_to_newppt.py");
    assert_eq!(descriptor.points.len(), 1);
    assert_eq!(descriptor.points[0].name, "pairs");

    // Templates not mentioned accept the standard vocabulary
    let fallback = settings.catalog.descriptor("s3_url_updater.py");
    assert!(fallback.point("multimedia_data").is_some());
}

#[test]
fn test_missing_env_var_fails_resolution() {
    let yaml = r#"
version: "1.0"
execution:
  interpreter: "${OPS_INTERPRETER}"
"#;
    let config = parse_str(yaml).unwrap();
    assert!(find_env_references(&config).contains("OPS_INTERPRETER"));

    let err = resolve_settings(&config, Path::new("."), &ResolutionContext::empty()).unwrap_err();
    assert!(matches!(err, ConfigError::EnvVarNotFound(ref name) if name == "OPS_INTERPRETER"));
}

#[test]
fn test_overriding_builtin_task() {
    let yaml = r#"
version: "1.0"
templates:
  sheet_loading_v2.py:
    injections:
      GOOGLE_SHEET_URL: text
tasks:
  sheet-loading:
    template: sheet_loading_v2.py
    injection: GOOGLE_SHEET_URL
"#;
    let config = parse_str(yaml).unwrap();
    let settings = resolve_settings(&config, Path::new("."), &ResolutionContext::empty()).unwrap();

    assert_eq!(settings.tasks.len(), 7);
    assert_eq!(settings.tasks["sheet-loading"].template, "sheet_loading_v2.py");
}

#[test]
fn test_redeclared_template_must_keep_task_point() {
    // The built-in sheet-loading task needs GOOGLE_SHEET_URL
    let yaml = r#"
version: "1.0"
templates:
  sheet_loading.py:
    injections:
      SHEET_ID: text
"#;
    assert!(matches!(
        parse_str(yaml),
        Err(ConfigError::ValidationError(_))
    ));
}

#[test]
fn test_unknown_shape_is_yaml_error() {
    let yaml = r#"
version: "1.0"
templates:
  report.py:
    injections:
      IDS: integer
"#;
    assert!(matches!(parse_str(yaml), Err(ConfigError::YamlError(_))));
}

#[test]
fn test_load_settings_relative_to_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("ops-runner.yaml");
    std::fs::write(
        &path,
        r#"
version: "1.0"
paths:
  template_catalog: "${RUNNER_CONFIG_TEST_UNSET_VAR:-templates}"
  runtime_dir: work
"#,
    )
    .unwrap();

    let settings = load_settings(&path).unwrap();
    assert_eq!(settings.runner.template_catalog, dir.path().join("templates"));
    assert_eq!(settings.runner.runtime_dir, dir.path().join("work"));
    assert_eq!(settings.runner.logs_dir, dir.path().join("work").join("outputs"));
    assert_eq!(settings.catalog.root(), dir.path().join("templates"));
}

#[test]
fn test_missing_file() {
    let dir = tempfile::tempdir().unwrap();
    let err = parse_file(dir.path().join("absent.yaml")).unwrap_err();
    assert!(matches!(err, ConfigError::ReadError(_)));
}

#[test]
fn test_default_config_roundtrips_through_yaml() {
    let yaml = serde_yaml::to_string(&Config::default()).unwrap();
    assert!(!yaml.contains("paths"));
    assert!(!yaml.contains("execution"));

    let parsed = parse_str(&yaml).unwrap();
    assert_eq!(parsed.version, "1.0");
}
