use crate::commands::{parse_value, print_outcome};
use crate::settings;
use anyhow::{Context, Result};
use std::path::Path;

pub async fn run(config_path: Option<&Path>, name: &str, value: &str, json: bool) -> Result<()> {
    let service = settings::service(settings::load(config_path)?);

    let outcome = service
        .run_task(name, parse_value(value))
        .await
        .with_context(|| format!("Task {} failed to start", name))?;

    print_outcome(&outcome, json)
}
