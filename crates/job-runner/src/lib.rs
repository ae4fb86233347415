//! # Job Runner
//!
//! Templated script jobs with per-job logs.
//!
//! A job takes a script template from the catalog, rewrites the template's
//! declared injection points with caller-supplied values, optionally points
//! the script's browser driver bootstrap at a locally cached driver, writes
//! the result to a job-scoped copy and runs it as a child process bounded by
//! a wall-clock timeout. The combined output lands in `<logs_dir>/<job_id>.log`
//! and the caller gets back the job id and a terminal status.
//!
//! ## Example
//!
//! ```no_run
//! use job_runner::{InjectionSet, InjectionValue, JobService, RunnerConfig};
//!
//! # async fn example() -> job_runner::Result<()> {
//! let service = JobService::new(RunnerConfig::rooted_at("/srv/ops"));
//!
//! let values = InjectionSet::new().with(
//!     "GOOGLE_SHEET_URL",
//!     InjectionValue::Text("https://docs.google.com/spreadsheets/d/abc".into()),
//! );
//! let outcome = service.submit("sheet_loading.py", &values).await?;
//! println!("{} -> {}", outcome.job_id, outcome.status);
//!
//! let log = service.fetch_log(&outcome.job_id).await?;
//! # let _ = log;
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]

pub mod config;
pub mod driver;
pub mod error;
pub mod executor;
pub mod inject;
pub mod literal;
pub mod log_store;
pub mod service;
pub mod template;
pub mod workspace;

pub use config::RunnerConfig;
pub use driver::{CachedDriverLocator, DriverLocator, DriverLookup, NoDriverLocator};
pub use error::{JobError, Result};
pub use executor::{JobExecutor, JobStatus};
pub use inject::{InjectionReport, InjectionSet, InjectionValue, Record};
pub use log_store::JobLogStore;
pub use service::{JobOutcome, JobService, JobServiceBuilder, TaskAlias};
pub use template::{
    InjectionPoint, Template, TemplateCatalog, TemplateDescriptor, ValueShape, is_plain_file_name,
};
pub use workspace::{Job, JobWorkspace};
