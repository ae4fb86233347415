pub mod log;
pub mod submit;
pub mod task;
pub mod tasks;
pub mod templates;
pub mod validate;

use anyhow::Result;
use job_runner::JobOutcome;
use serde_json::Value;

/// Parse a command line value as JSON, falling back to a plain string
pub fn parse_value(raw: &str) -> Value {
    serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_string()))
}

/// Print a job outcome for humans or as JSON
pub fn print_outcome(outcome: &JobOutcome, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(outcome)?);
    } else {
        println!("job_id:   {}", outcome.job_id);
        println!("status:   {}", outcome.status);
        println!("log_path: {}", outcome.log_path.display());
    }
    Ok(())
}
