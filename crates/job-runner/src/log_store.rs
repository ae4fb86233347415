//! Read access to job logs

use crate::error::{JobError, Result};
use crate::workspace::log_file_name;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

/// One log file per job, looked up by job id
#[derive(Debug, Clone)]
pub struct JobLogStore {
    logs_dir: PathBuf,
}

impl JobLogStore {
    /// Create a store over `logs_dir`
    pub fn new(logs_dir: impl Into<PathBuf>) -> Self {
        Self {
            logs_dir: logs_dir.into(),
        }
    }

    /// Logs directory
    pub fn logs_dir(&self) -> &Path {
        &self.logs_dir
    }

    /// Path a job's log lives at
    pub fn log_path(&self, job_id: &str) -> Result<PathBuf> {
        validate_job_id(job_id)?;
        Ok(self.logs_dir.join(log_file_name(job_id)))
    }

    /// Full log text of a job
    ///
    /// Bytes that are not valid UTF-8 are replaced with U+FFFD.
    pub async fn read(&self, job_id: &str) -> Result<String> {
        let path = self.log_path(job_id)?;
        match async_fs::read(&path).await {
            Ok(bytes) => Ok(String::from_utf8_lossy(&bytes).into_owned()),
            Err(e) if e.kind() == ErrorKind::NotFound => Err(JobError::LogNotFound {
                job_id: job_id.to_string(),
            }),
            Err(e) => Err(e.into()),
        }
    }
}

/// Job ids are ASCII alphanumerics, `-` and `_`
pub fn validate_job_id(job_id: &str) -> Result<()> {
    let valid = !job_id.is_empty()
        && job_id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
    if valid {
        Ok(())
    } else {
        Err(JobError::InvalidJobId(job_id.to_string()))
    }
}
