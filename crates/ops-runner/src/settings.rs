//! Configuration loading shared by the subcommands

use anyhow::{Context, Result};
use job_runner::JobService;
use runner_config::resolver::ResolutionContext;
use runner_config::{Config, RunnerSettings};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Config file looked up in the working directory when `--config` is not given
pub const DEFAULT_CONFIG: &str = "ops-runner.yaml";

/// The file `--config` points at, or the default one if it exists
pub fn config_path(explicit: Option<&Path>) -> Option<PathBuf> {
    match explicit {
        Some(path) => Some(path.to_path_buf()),
        None => {
            let default = Path::new(DEFAULT_CONFIG);
            default.is_file().then(|| default.to_path_buf())
        }
    }
}

/// Load settings from the config file, or built-in defaults when there is none
pub fn load(explicit: Option<&Path>) -> Result<RunnerSettings> {
    match config_path(explicit) {
        Some(path) => {
            debug!("Loading configuration from {}", path.display());
            runner_config::load_settings(&path)
                .with_context(|| format!("Failed to load configuration from {}", path.display()))
        }
        None => {
            debug!("No {} found, using built-in defaults", DEFAULT_CONFIG);
            runner_config::resolve_settings(
                &Config::default(),
                Path::new("."),
                &ResolutionContext::new(),
            )
            .context("Failed to resolve default configuration")
        }
    }
}

/// Build the job service for these settings
pub fn service(settings: RunnerSettings) -> JobService {
    JobService::builder(settings.runner)
        .catalog(settings.catalog)
        .tasks(settings.tasks)
        .build()
}
