//! Runtime configuration passed into every component at construction

use std::path::{Path, PathBuf};
use std::time::Duration;

/// Default wall-clock bound for a single job
pub const DEFAULT_SCRIPT_TIMEOUT: Duration = Duration::from_secs(300);

/// Default interpreter used to run finalized scripts
pub const DEFAULT_INTERPRETER: &str = "python3";

/// Paths and limits used by the job runner
#[derive(Debug, Clone, PartialEq)]
pub struct RunnerConfig {
    /// Directory holding the script templates
    pub template_catalog: PathBuf,
    /// Parent of the per-job working directories
    pub runtime_dir: PathBuf,
    /// Shared directory for finalized script copies
    pub copies_dir: PathBuf,
    /// Shared directory for job logs
    pub logs_dir: PathBuf,
    /// Driver cache to search when patching the driver bootstrap.
    /// `None` means `~/.wdm/drivers/chromedriver`.
    pub driver_cache_dir: Option<PathBuf>,
    /// Program that runs a finalized script
    pub interpreter: String,
    /// Wall-clock bound for the whole child process lifetime
    pub script_timeout: Duration,
    /// Whether to rewrite the driver bootstrap expression at all
    pub patch_driver: bool,
}

impl RunnerConfig {
    /// Build a configuration rooted at `base`, using the conventional layout
    /// (`scripts/originals`, `runtime`, `runtime/copies`, `runtime/outputs`)
    pub fn rooted_at(base: impl AsRef<Path>) -> Self {
        let base = base.as_ref();
        let runtime_dir = base.join("runtime");
        Self {
            template_catalog: base.join("scripts").join("originals"),
            copies_dir: runtime_dir.join("copies"),
            logs_dir: runtime_dir.join("outputs"),
            runtime_dir,
            driver_cache_dir: None,
            interpreter: DEFAULT_INTERPRETER.to_string(),
            script_timeout: DEFAULT_SCRIPT_TIMEOUT,
            patch_driver: true,
        }
    }

    /// Set the script timeout
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.script_timeout = timeout;
        self
    }

    /// Set the interpreter
    pub fn with_interpreter(mut self, interpreter: impl Into<String>) -> Self {
        self.interpreter = interpreter.into();
        self
    }

    /// Driver cache directory, falling back to the home directory default
    pub fn resolved_driver_cache_dir(&self) -> Option<PathBuf> {
        self.driver_cache_dir.clone().or_else(|| {
            dirs::home_dir().map(|home| {
                home.join(".wdm")
                    .join("drivers")
                    .join("chromedriver")
            })
        })
    }
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self::rooted_at(".")
    }
}
