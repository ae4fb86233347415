use crate::commands::{parse_value, print_outcome};
use crate::settings;
use anyhow::{Context, Result, bail};
use serde_json::{Map, Value};
use std::path::Path;
use tracing::info;

pub async fn run(
    config_path: Option<&Path>,
    template: &str,
    set: &[String],
    values_file: Option<&Path>,
    json: bool,
) -> Result<()> {
    let mut values = match values_file {
        Some(path) => read_values(path)?,
        None => Map::new(),
    };
    for assignment in set {
        let (name, value) = parse_assignment(assignment)?;
        values.insert(name, value);
    }

    let service = settings::service(settings::load(config_path)?);
    info!("Submitting {} with {} value(s)", template, values.len());

    let outcome = service
        .submit_json(template, values)
        .await
        .with_context(|| format!("Failed to submit {}", template))?;

    print_outcome(&outcome, json)
}

fn read_values(path: &Path) -> Result<Map<String, Value>> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    match serde_json::from_str::<Value>(&content)
        .with_context(|| format!("Failed to parse {}", path.display()))?
    {
        Value::Object(map) => Ok(map),
        _ => bail!("{} must contain a JSON object", path.display()),
    }
}

/// Split `NAME=JSON` at the first `=`
fn parse_assignment(assignment: &str) -> Result<(String, Value)> {
    match assignment.split_once('=') {
        Some((name, raw)) if !name.is_empty() => Ok((name.to_string(), parse_value(raw))),
        _ => bail!("Expected NAME=VALUE, got '{}'", assignment),
    }
}
