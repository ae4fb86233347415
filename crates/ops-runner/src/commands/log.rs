use crate::settings;
use anyhow::{Context, Result};
use std::io::Write;
use std::path::Path;

pub async fn run(config_path: Option<&Path>, job_id: &str) -> Result<()> {
    let service = settings::service(settings::load(config_path)?);

    let log = service
        .fetch_log(job_id)
        .await
        .with_context(|| format!("Failed to read log for job {}", job_id))?;

    let mut stdout = std::io::stdout().lock();
    stdout.write_all(log.as_bytes())?;
    stdout.flush()?;
    Ok(())
}
