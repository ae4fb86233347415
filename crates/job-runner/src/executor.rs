//! Timed execution of finalized scripts
//!
//! A job runs as one child process (`<interpreter> <script>`) whose merged
//! output is captured into the job's log between a start and an end marker.
//! The exit code does not affect the job's status: any normal exit is
//! `finished`. Only a timeout or a failure to launch or drive the process
//! produces another status.

use crate::config::RunnerConfig;
use crate::error::Result;
use crate::workspace::Job;
use async_io::Timer;
use chrono::{SecondsFormat, Utc};
use command_executor::{Command, ExitStatus, Launcher, LocalLauncher, ProcessHandle};
use futures::StreamExt;
use futures_lite::AsyncWriteExt;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{error, info, warn};

/// Marker appended when a job is killed for running too long
pub const TIMEOUT_MARKER: &str = "\n--- TIMEOUT (killed) ---\n";

/// Terminal status of a job
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
    /// The script exited on its own, with any exit code
    Finished,
    /// The script exceeded the timeout and was killed
    Timeout,
    /// The script could not be launched or driven
    Error,
}

impl JobStatus {
    /// Lowercase name used in logs and output
    pub fn as_str(&self) -> &'static str {
        match self {
            JobStatus::Finished => "finished",
            JobStatus::Timeout => "timeout",
            JobStatus::Error => "error",
        }
    }
}

impl std::fmt::Display for JobStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Start marker line for a job
pub fn start_marker(job_id: &str) -> String {
    format!("--- JOB {} START {}\n", job_id, timestamp())
}

/// End marker line for a job
pub fn end_marker(job_id: &str, status: JobStatus) -> String {
    format!("\n--- JOB {} END {} status={}\n", job_id, timestamp(), status)
}

/// Error marker for a job that could not be run
pub fn error_marker(description: &str) -> String {
    format!("\n--- ERROR: {} ---\n", description)
}

fn timestamp() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

enum Outcome {
    Exited(ExitStatus),
    TimedOut,
}

/// Runs jobs through a [`Launcher`] with a wall-clock bound
pub struct JobExecutor<L: Launcher = LocalLauncher> {
    launcher: L,
    interpreter: String,
    timeout: Duration,
}

impl JobExecutor<LocalLauncher> {
    /// Create an executor that runs scripts as local processes
    pub fn new(config: &RunnerConfig) -> Self {
        Self::with_launcher(config, LocalLauncher)
    }
}

impl<L: Launcher> JobExecutor<L> {
    /// Create an executor over a specific launcher
    pub fn with_launcher(config: &RunnerConfig, launcher: L) -> Self {
        Self {
            launcher,
            interpreter: config.interpreter.clone(),
            timeout: config.script_timeout,
        }
    }

    /// Configured timeout
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Run `job` to a terminal status, writing its log
    ///
    /// Returns `Err` only when the log file itself cannot be written.
    pub async fn run(&self, job: &Job) -> Result<JobStatus> {
        let mut log = async_fs::File::create(&job.log_path).await?;
        log.write_all(start_marker(&job.job_id).as_bytes()).await?;
        log.flush().await?;

        info!("Running job {} ({})", job.job_id, job.template_key);

        let status = match self.execute(job, &mut log).await {
            Ok(status) => status,
            Err(e) => {
                error!("Job {} failed to run: {}", job.job_id, e);
                log.write_all(error_marker(&e.to_string()).as_bytes()).await?;
                JobStatus::Error
            }
        };

        log.write_all(end_marker(&job.job_id, status).as_bytes()).await?;
        log.flush().await?;

        info!("Job {} ended with status {}", job.job_id, status);
        Ok(status)
    }

    async fn execute(&self, job: &Job, log: &mut async_fs::File) -> Result<JobStatus> {
        let mut command = Command::script(&self.interpreter, &job.script_path);
        command.current_dir(&job.job_dir);

        let (mut events, mut handle) = self.launcher.launch(command).await?;
        let mut output = Vec::new();

        let outcome = {
            let collect = async {
                while let Some(event) = events.next().await {
                    if let Some(data) = event.data {
                        output.extend_from_slice(&data);
                    }
                }
                handle.wait().await.map(Outcome::Exited)
            };
            let deadline = async {
                Timer::after(self.timeout).await;
                Ok(Outcome::TimedOut)
            };
            futures_lite::future::or(collect, deadline).await?
        };

        match outcome {
            Outcome::Exited(status) => {
                info!(
                    "Job {} script exited (code {:?})",
                    job.job_id, status.code
                );
                log.write_all(&output).await?;
                Ok(JobStatus::Finished)
            }
            Outcome::TimedOut => {
                warn!(
                    "Job {} exceeded {:?}, killing pid {:?}",
                    job.job_id,
                    self.timeout,
                    handle.pid()
                );
                if let Err(e) = handle.kill().await {
                    warn!("Failed to kill job {}: {}", job.job_id, e);
                }
                drop(events);
                if let Err(e) = handle.wait().await {
                    warn!("Failed to reap job {}: {}", job.job_id, e);
                }

                log.write_all(&output).await?;
                log.write_all(TIMEOUT_MARKER.as_bytes()).await?;
                Ok(JobStatus::Timeout)
            }
        }
    }
}
