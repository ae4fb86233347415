use crate::settings;
use anyhow::{Context, Result, bail};
use runner_config::parser;
use runner_config::resolver::{ResolutionContext, missing_env_vars};
use std::path::Path;

pub async fn run(config_path: Option<&Path>) -> Result<()> {
    let Some(path) = settings::config_path(config_path) else {
        bail!(
            "No configuration file given and {} not found",
            settings::DEFAULT_CONFIG
        );
    };

    println!("Validating {}...", path.display());

    let config = parser::parse_file(&path).context("Failed to parse configuration")?;

    println!("✓ Configuration valid");
    println!("  Version: {}", config.version);

    if let Some(name) = &config.name {
        println!("  Name: {}", name);
    }

    println!("  Templates: {}", config.templates.len());
    println!("  Tasks: {}", parser::merged_tasks(&config).len());

    let missing = missing_env_vars(&config, &ResolutionContext::new());
    if !missing.is_empty() {
        println!(
            "  ⚠ References undefined environment variables: {}",
            missing.join(", ")
        );
        return Ok(());
    }

    let settings = settings::load(Some(path.as_path()))?;
    let runner = &settings.runner;
    println!("  Template catalog: {}", runner.template_catalog.display());
    println!("  Runtime dir: {}", runner.runtime_dir.display());
    println!("  Interpreter: {}", runner.interpreter);
    println!("  Timeout: {}s", runner.script_timeout.as_secs());

    if !runner.template_catalog.is_dir() {
        println!("  ⚠ Template catalog does not exist yet");
    }

    Ok(())
}
