//! Job workspace allocation
//!
//! Every job gets a fresh id, its own working directory under the runtime
//! directory, a finalized script copy in the shared copies directory, and a
//! log path in the shared logs directory. File names derive from the job id,
//! so concurrent jobs never touch the same path.

use crate::config::RunnerConfig;
use crate::error::Result;
use crate::template::TemplateCatalog;
use std::path::{Path, PathBuf};
use tracing::debug;
use uuid::Uuid;

/// One execution instance of a finalized script
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Job {
    /// Unique job id (32 lowercase hex characters)
    pub job_id: String,
    /// Template the script was made from
    pub template_key: String,
    /// Working directory for the child process
    pub job_dir: PathBuf,
    /// Finalized script copy
    pub script_path: PathBuf,
    /// Output log
    pub log_path: PathBuf,
}

/// Generate a fresh 128-bit job id
pub fn generate_job_id() -> String {
    Uuid::new_v4().simple().to_string()
}

/// File name of a job's log
pub fn log_file_name(job_id: &str) -> String {
    format!("{}.log", job_id)
}

/// File name of a job's finalized script copy
pub fn copy_file_name(job_id: &str, template_base_name: &str) -> String {
    format!("{}_{}", job_id, template_base_name)
}

/// Allocates job directories and persists finalized scripts
#[derive(Debug, Clone)]
pub struct JobWorkspace {
    catalog: TemplateCatalog,
    runtime_dir: PathBuf,
    copies_dir: PathBuf,
    logs_dir: PathBuf,
}

impl JobWorkspace {
    /// Create a workspace over the configured directories
    pub fn new(config: &RunnerConfig, catalog: TemplateCatalog) -> Self {
        Self {
            catalog,
            runtime_dir: config.runtime_dir.clone(),
            copies_dir: config.copies_dir.clone(),
            logs_dir: config.logs_dir.clone(),
        }
    }

    /// Shared logs directory
    pub fn logs_dir(&self) -> &Path {
        &self.logs_dir
    }

    /// Shared copies directory
    pub fn copies_dir(&self) -> &Path {
        &self.copies_dir
    }

    /// Create the shared copies and logs directories if missing
    pub async fn ensure_dirs(&self) -> Result<()> {
        async_fs::create_dir_all(&self.runtime_dir).await?;
        async_fs::create_dir_all(&self.copies_dir).await?;
        async_fs::create_dir_all(&self.logs_dir).await?;
        Ok(())
    }

    /// Allocate a job for `template_key` and write `finalized_text` as its script
    ///
    /// Fails with `TemplateNotFound` before creating anything when the
    /// template does not exist.
    pub async fn create(&self, template_key: &str, finalized_text: &str) -> Result<Job> {
        let template_path = self.catalog.resolve(template_key)?;
        let base_name = template_path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| template_key.to_string());

        let job_id = generate_job_id();
        let job_dir = self.runtime_dir.join(&job_id);

        async_fs::create_dir_all(&job_dir).await?;
        self.ensure_dirs().await?;

        let script_path = self.copies_dir.join(copy_file_name(&job_id, &base_name));
        async_fs::write(&script_path, finalized_text).await?;

        let log_path = self.logs_dir.join(log_file_name(&job_id));

        debug!(
            "Created job {} for {} at {}",
            job_id,
            template_key,
            script_path.display()
        );

        Ok(Job {
            job_id,
            template_key: template_key.to_string(),
            job_dir,
            script_path,
            log_path,
        })
    }
}
