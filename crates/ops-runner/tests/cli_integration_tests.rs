//! End-to-end tests for the ops-runner command line

#![cfg(unix)]

use anyhow::Result;

mod common;
use common::CliTestContext;

#[test]
fn test_submit_then_fetch_log() -> Result<()> {
    let ctx = CliTestContext::new()?;

    let output = ctx.run_cli_command(&["submit", "hello.sh", "--json"])?;
    output.assert_success();
    let outcome = output.json();
    assert_eq!(outcome["status"], "finished");

    let job_id = outcome["job_id"].as_str().unwrap().to_string();
    assert_eq!(job_id.len(), 32);
    assert!(ctx.path().join("runtime/outputs").join(format!("{}.log", job_id)).is_file());

    let output = ctx.run_cli_command(&["log", &job_id])?;
    output
        .assert_success()
        .assert_stdout_contains(&format!("--- JOB {} START", job_id))
        .assert_stdout_contains("hello from job")
        .assert_stdout_contains("status=finished");

    Ok(())
}

#[test]
fn test_submit_with_injected_value() -> Result<()> {
    let ctx = CliTestContext::new()?;

    let output = ctx.run_cli_command(&["submit", "greet.sh", "--set", "WHO=operator"])?;
    output
        .assert_success()
        .assert_stdout_contains("status:   finished");

    let job_id = output
        .stdout
        .lines()
        .find_map(|line| line.strip_prefix("job_id:"))
        .map(|id| id.trim().to_string())
        .unwrap();

    ctx.run_cli_command(&["log", &job_id])?
        .assert_success()
        .assert_stdout_contains("hi operator");

    Ok(())
}

#[test]
fn test_submit_rejects_undeclared_value() -> Result<()> {
    let ctx = CliTestContext::new()?;

    ctx.run_cli_command(&["submit", "greet.sh", "--set", r#"uuid_list=["a"]"#])?
        .assert_failure()
        .assert_contains("has no injection point named 'uuid_list'");

    assert!(!ctx.path().join("runtime").exists());
    Ok(())
}

#[test]
fn test_submit_unknown_template() -> Result<()> {
    let ctx = CliTestContext::new()?;

    ctx.run_cli_command(&["submit", "missing.sh"])?
        .assert_failure()
        .assert_contains("template not found: missing.sh");

    Ok(())
}

#[test]
fn test_task_alias() -> Result<()> {
    let ctx = CliTestContext::new()?;

    let output = ctx.run_cli_command(&["task", "greet", r#""team""#, "--json"])?;
    output.assert_success();
    let job_id = output.json()["job_id"].as_str().unwrap().to_string();

    ctx.run_cli_command(&["log", &job_id])?
        .assert_success()
        .assert_stdout_contains("hi team");

    ctx.run_cli_command(&["task", "not-a-task", "[]"])?
        .assert_failure()
        .assert_contains("unknown task: not-a-task");

    Ok(())
}

#[test]
fn test_log_not_found() -> Result<()> {
    let ctx = CliTestContext::new()?;

    ctx.run_cli_command(&["log", "0123456789abcdef0123456789abcdef"])?
        .assert_failure()
        .assert_contains("log not found for job 0123456789abcdef0123456789abcdef");

    Ok(())
}

#[test]
fn test_templates_and_tasks_listing() -> Result<()> {
    let ctx = CliTestContext::new()?;

    ctx.run_cli_command(&["templates"])?
        .assert_success()
        .assert_stdout_contains("greet.sh")
        .assert_stdout_contains("WHO (text)")
        .assert_stdout_contains("hello.sh")
        .assert_stdout_contains("uuid_list (text_list)");

    ctx.run_cli_command(&["tasks"])?
        .assert_success()
        .assert_stdout_contains("greet")
        .assert_stdout_contains("sheet-loading");

    Ok(())
}

#[test]
fn test_validate() -> Result<()> {
    let ctx = CliTestContext::new()?;

    ctx.run_cli_command(&["validate"])?
        .assert_success()
        .assert_stdout_contains("Configuration valid")
        .assert_stdout_contains("Name: cli-tests")
        .assert_stdout_contains("Interpreter: sh");

    std::fs::write(&ctx.config_path, "version: \"0.9\"\n")?;
    ctx.run_cli_command(&["validate"])?
        .assert_failure()
        .assert_contains("Unsupported version");

    Ok(())
}
