//! Error types for job submission and log retrieval

use thiserror::Error;

/// Errors surfaced to the caller of the job service
///
/// Anything that goes wrong while a job's script is running is recorded in
/// the job's log and reported through [`JobStatus`](crate::JobStatus)
/// instead.
#[derive(Error, Debug)]
pub enum JobError {
    /// Requested template key has no backing file in the catalog
    #[error("template not found: {key}")]
    TemplateNotFound {
        /// The requested template key
        key: String,
    },

    /// Injection name is not declared by the template's descriptor
    #[error("template '{template}' has no injection point named '{name}'")]
    UnknownInjection {
        /// Template key
        template: String,
        /// Offending injection name
        name: String,
    },

    /// Injection value does not match the declared shape
    #[error("invalid value for injection '{name}': {reason}")]
    InvalidInjection {
        /// Injection name
        name: String,
        /// What was wrong with the value
        reason: String,
    },

    /// Task alias is not configured
    #[error("unknown task: {0}")]
    UnknownTask(String),

    /// No log exists for the job id
    #[error("log not found for job {job_id}")]
    LogNotFound {
        /// The requested job id
        job_id: String,
    },

    /// Job id contains characters that can never appear in a generated id
    #[error("invalid job id: {0:?}")]
    InvalidJobId(String),

    /// Command executor errors
    #[error("command execution error: {0}")]
    Command(#[from] command_executor::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl JobError {
    /// Create an invalid injection error
    pub fn invalid_injection(name: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidInjection {
            name: name.into(),
            reason: reason.into(),
        }
    }
}

/// Result type alias
pub type Result<T> = std::result::Result<T, JobError>;
