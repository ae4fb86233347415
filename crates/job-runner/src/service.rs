//! Job submission facade
//!
//! Ties the pieces together: load a template, validate and inject values,
//! patch the driver bootstrap, allocate a workspace and run the script.

use crate::config::RunnerConfig;
use crate::driver::{
    BOOTSTRAP_EXPRESSIONS, CachedDriverLocator, DriverLocator, NoDriverLocator,
    patch_driver_bootstrap,
};
use crate::error::{JobError, Result};
use crate::executor::{JobExecutor, JobStatus};
use crate::inject::{InjectionSet, inject};
use crate::log_store::JobLogStore;
use crate::template::TemplateCatalog;
use crate::workspace::JobWorkspace;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{debug, info};

/// Result of a submitted job
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobOutcome {
    /// Job id to fetch the log with
    pub job_id: String,
    /// Where the log was written
    pub log_path: PathBuf,
    /// Terminal status
    pub status: JobStatus,
}

/// A named shortcut that feeds one value into one template's injection point
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskAlias {
    /// Template key
    pub template: String,
    /// Injection point the task's value goes into
    pub injection: String,
}

impl TaskAlias {
    /// Create a task alias
    pub fn new(template: impl Into<String>, injection: impl Into<String>) -> Self {
        Self {
            template: template.into(),
            injection: injection.into(),
        }
    }

    /// The stock task set for the bundled automation scripts
    pub fn defaults() -> BTreeMap<String, TaskAlias> {
        [
            ("ppt-to-video", "ppt_to_video_updater.py", "uuid_list"),
            ("sheet-loading", "sheet_loading.py", "GOOGLE_SHEET_URL"),
            ("s3-updater", "s3_url_updater.py", "multimedia_data"),
            ("get-question-ids-by-tags", "getting_question_ids_for_tags.py", "multimedia_data"),
            ("duration-remover", "duration_remover.py", "uuid_list"),
            ("unlock-resources", "unlock_resources_for_users.py", "uuid_list"),
            ("oldppt-to-newppt", "oldppt_to_newppt.py", "pairs"),
        ]
        .into_iter()
        .map(|(name, template, injection)| (name.to_string(), TaskAlias::new(template, injection)))
        .collect()
    }
}

struct Inner {
    config: RunnerConfig,
    catalog: TemplateCatalog,
    workspace: JobWorkspace,
    executor: JobExecutor,
    logs: JobLogStore,
    locator: Box<dyn DriverLocator>,
    tasks: BTreeMap<String, TaskAlias>,
}

/// Entry point for submitting jobs and fetching their logs
///
/// Cheap to clone; clones share the same configuration.
#[derive(Clone)]
pub struct JobService {
    inner: Arc<Inner>,
}

/// Builder for [`JobService`]
pub struct JobServiceBuilder {
    config: RunnerConfig,
    catalog: Option<TemplateCatalog>,
    locator: Option<Box<dyn DriverLocator>>,
    tasks: BTreeMap<String, TaskAlias>,
}

impl JobServiceBuilder {
    /// Use a catalog with explicit descriptors
    pub fn catalog(mut self, catalog: TemplateCatalog) -> Self {
        self.catalog = Some(catalog);
        self
    }

    /// Use a specific driver locator
    pub fn locator(mut self, locator: impl DriverLocator + 'static) -> Self {
        self.locator = Some(Box::new(locator));
        self
    }

    /// Replace the task aliases
    pub fn tasks(mut self, tasks: BTreeMap<String, TaskAlias>) -> Self {
        self.tasks = tasks;
        self
    }

    /// Build the service
    pub fn build(self) -> JobService {
        let config = self.config;
        let catalog = self
            .catalog
            .unwrap_or_else(|| TemplateCatalog::new(&config.template_catalog));
        let locator = self.locator.unwrap_or_else(|| default_locator(&config));

        JobService {
            inner: Arc::new(Inner {
                workspace: JobWorkspace::new(&config, catalog.clone()),
                executor: JobExecutor::new(&config),
                logs: JobLogStore::new(&config.logs_dir),
                catalog,
                locator,
                tasks: self.tasks,
                config,
            }),
        }
    }
}

fn default_locator(config: &RunnerConfig) -> Box<dyn DriverLocator> {
    match config.resolved_driver_cache_dir() {
        Some(root) if config.patch_driver => Box::new(CachedDriverLocator::new(root)),
        _ => Box::new(NoDriverLocator),
    }
}

impl JobService {
    /// Start building a service from `config`
    pub fn builder(config: RunnerConfig) -> JobServiceBuilder {
        JobServiceBuilder {
            config,
            catalog: None,
            locator: None,
            tasks: TaskAlias::defaults(),
        }
    }

    /// Service with the default catalog, locator and tasks
    pub fn new(config: RunnerConfig) -> Self {
        Self::builder(config).build()
    }

    /// Active configuration
    pub fn config(&self) -> &RunnerConfig {
        &self.inner.config
    }

    /// Template catalog
    pub fn catalog(&self) -> &TemplateCatalog {
        &self.inner.catalog
    }

    /// Configured task aliases
    pub fn tasks(&self) -> &BTreeMap<String, TaskAlias> {
        &self.inner.tasks
    }

    /// Produce the finalized script text for a template without running it
    pub async fn finalize(&self, template_key: &str, injections: &InjectionSet) -> Result<String> {
        let template = self.inner.catalog.load(template_key).await?;
        let descriptor = self.inner.catalog.descriptor(template_key);
        injections.validate(&descriptor)?;

        let injected = inject(&template.text, injections);
        if !injected.report.skipped.is_empty() {
            debug!(
                "Template {} has no assignment for: {}",
                template_key,
                injected.report.skipped.join(", ")
            );
        }

        let needs_patch = self.inner.config.patch_driver
            && BOOTSTRAP_EXPRESSIONS
                .iter()
                .any(|expr| injected.text.contains(expr));
        if needs_patch {
            let lookup = self.inner.locator.locate();
            return Ok(patch_driver_bootstrap(&injected.text, &lookup));
        }
        Ok(injected.text)
    }

    /// Run a template with typed injections and wait for it to finish
    pub async fn submit(&self, template_key: &str, injections: &InjectionSet) -> Result<JobOutcome> {
        let finalized = self.finalize(template_key, injections).await?;
        let job = self.inner.workspace.create(template_key, &finalized).await?;
        let status = self.inner.executor.run(&job).await?;

        Ok(JobOutcome {
            job_id: job.job_id,
            log_path: job.log_path,
            status,
        })
    }

    /// Run a template with raw JSON values, validated against its descriptor
    pub async fn submit_json(
        &self,
        template_key: &str,
        values: Map<String, Value>,
    ) -> Result<JobOutcome> {
        // An unknown template is reported before any value problem
        self.inner.catalog.resolve(template_key)?;
        let descriptor = self.inner.catalog.descriptor(template_key);
        let injections = InjectionSet::from_json(&descriptor, values)?;
        self.submit(template_key, &injections).await
    }

    /// Run a task alias with its single value
    pub async fn run_task(&self, task: &str, value: Value) -> Result<JobOutcome> {
        let alias = self
            .inner
            .tasks
            .get(task)
            .ok_or_else(|| JobError::UnknownTask(task.to_string()))?;

        info!("Running task {} via {}", task, alias.template);
        let mut values = Map::new();
        values.insert(alias.injection.clone(), value);
        self.submit_json(&alias.template, values).await
    }

    /// Full log text of a finished job
    pub async fn fetch_log(&self, job_id: &str) -> Result<String> {
        self.inner.logs.read(job_id).await
    }
}
