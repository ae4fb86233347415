//! # Runner Configuration
//!
//! YAML configuration parser for ops-runner.
//!
//! This crate parses `ops-runner.yaml` files and converts them into the
//! job runner's types: a [`RunnerConfig`], a [`TemplateCatalog`] carrying the
//! declared template descriptors, and the task alias table.
//!
//! ```yaml
//! version: "1.0"
//! paths:
//!   template_catalog: "${OPS_HOME:-.}/scripts/originals"
//!   runtime_dir: runtime
//! execution:
//!   interpreter: python3
//!   script_timeout: 300
//! templates:
//!   sheet_loading.py:
//!     injections:
//!       GOOGLE_SHEET_URL: text
//! tasks:
//!   sheet-loading:
//!     template: sheet_loading.py
//!     injection: GOOGLE_SHEET_URL
//! ```

#![warn(missing_docs)]

use job_runner::{RunnerConfig, TaskAlias, TemplateCatalog, ValueShape};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use thiserror::Error;

pub mod parser;
pub mod resolver;

/// Configuration error types
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read configuration file
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    /// Failed to parse YAML
    #[error("Failed to parse YAML: {0}")]
    YamlError(#[from] serde_yaml::Error),

    /// Invalid configuration
    #[error("Invalid configuration: {0}")]
    ValidationError(String),

    /// Environment variable not found
    #[error("Environment variable not found: {0}")]
    EnvVarNotFound(String),
}

/// Result type for configuration operations
pub type Result<T> = std::result::Result<T, ConfigError>;

/// Supported configuration version
pub const CONFIG_VERSION: &str = "1.0";

/// Root configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Configuration version
    pub version: String,

    /// Optional deployment name
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// Filesystem layout
    #[serde(default, skip_serializing_if = "Paths::is_default")]
    pub paths: Paths,

    /// How scripts are run
    #[serde(default, skip_serializing_if = "Execution::is_default")]
    pub execution: Execution,

    /// Injection descriptors keyed by template file name
    #[serde(default)]
    pub templates: BTreeMap<String, TemplateSpec>,

    /// Task aliases, merged over the built-in set
    #[serde(default)]
    pub tasks: BTreeMap<String, TaskSpec>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            version: CONFIG_VERSION.to_string(),
            name: None,
            paths: Paths::default(),
            execution: Execution::default(),
            templates: BTreeMap::new(),
            tasks: BTreeMap::new(),
        }
    }
}

/// Directory settings; relative paths are taken from the config file's directory
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct Paths {
    /// Template directory
    #[serde(skip_serializing_if = "Option::is_none")]
    pub template_catalog: Option<String>,

    /// Parent of per-job working directories
    #[serde(skip_serializing_if = "Option::is_none")]
    pub runtime_dir: Option<String>,

    /// Finalized script copies, defaults to `<runtime_dir>/copies`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub copies_dir: Option<String>,

    /// Job logs, defaults to `<runtime_dir>/outputs`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub logs_dir: Option<String>,

    /// Browser driver cache
    #[serde(skip_serializing_if = "Option::is_none")]
    pub driver_cache_dir: Option<String>,
}

impl Paths {
    fn is_default(&self) -> bool {
        self == &Paths::default()
    }
}

/// Execution settings
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct Execution {
    /// Interpreter program
    #[serde(skip_serializing_if = "Option::is_none")]
    pub interpreter: Option<String>,

    /// Timeout in seconds
    #[serde(skip_serializing_if = "Option::is_none")]
    pub script_timeout: Option<u64>,

    /// Rewrite the driver bootstrap expression
    #[serde(skip_serializing_if = "Option::is_none")]
    pub patch_driver: Option<bool>,
}

impl Execution {
    fn is_default(&self) -> bool {
        self == &Execution::default()
    }
}

/// Declared injection points of one template
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct TemplateSpec {
    /// Point name to value shape
    #[serde(default)]
    pub injections: BTreeMap<String, ValueShape>,
}

/// A task alias as written in the file
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TaskSpec {
    /// Template key
    pub template: String,
    /// Injection point that receives the task's value
    pub injection: String,
}

/// Everything the job runner needs, resolved from a [`Config`]
#[derive(Debug, Clone)]
pub struct RunnerSettings {
    /// Paths and limits
    pub runner: RunnerConfig,
    /// Catalog with declared descriptors
    pub catalog: TemplateCatalog,
    /// Task aliases
    pub tasks: BTreeMap<String, TaskAlias>,
}

pub use parser::{load_settings, parse_file, parse_str, resolve_settings};
