//! Common test utilities for CLI integration tests

#![allow(dead_code)]

use anyhow::Result;
use std::path::{Path, PathBuf};
use std::process::Command;
use tempfile::TempDir;

/// A scratch deployment: config file, template catalog and runtime dirs
pub struct CliTestContext {
    pub test_dir: TempDir,
    pub config_path: PathBuf,
}

impl CliTestContext {
    /// Create a deployment that runs templates with `sh`
    pub fn new() -> Result<Self> {
        let test_dir = TempDir::new()?;
        let config_path = test_dir.path().join("ops-runner.yaml");

        std::fs::write(
            &config_path,
            r#"
version: "1.0"
name: "cli-tests"
paths:
  template_catalog: templates
  runtime_dir: runtime
execution:
  interpreter: sh
  script_timeout: 10
  patch_driver: false
templates:
  greet.sh:
    injections:
      WHO: text
tasks:
  greet:
    template: greet.sh
    injection: WHO
"#,
        )?;

        std::fs::create_dir_all(test_dir.path().join("templates"))?;

        let ctx = Self {
            test_dir,
            config_path,
        };
        ctx.write_template("hello.sh", "echo hello from job\n")?;
        ctx.write_template("greet.sh", "WHO=\"nobody\"\necho \"hi $WHO\"\n")?;
        Ok(ctx)
    }

    pub fn path(&self) -> &Path {
        self.test_dir.path()
    }

    pub fn write_template(&self, key: &str, text: &str) -> Result<()> {
        std::fs::write(self.path().join("templates").join(key), text)?;
        Ok(())
    }

    /// Run the CLI with this deployment's config file
    pub fn run_cli_command(&self, args: &[&str]) -> Result<CliOutput> {
        let output = Command::new(env!("CARGO_BIN_EXE_ops-runner"))
            .arg("--config")
            .arg(&self.config_path)
            .args(args)
            .current_dir(self.path())
            .output()?;

        Ok(CliOutput {
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
            success: output.status.success(),
            exit_code: output.status.code(),
        })
    }
}

pub struct CliOutput {
    pub stdout: String,
    pub stderr: String,
    pub success: bool,
    pub exit_code: Option<i32>,
}

impl CliOutput {
    pub fn assert_success(&self) -> &Self {
        if !self.success {
            panic!(
                "Command failed with exit code {:?}\nSTDOUT:\n{}\nSTDERR:\n{}",
                self.exit_code, self.stdout, self.stderr
            );
        }
        self
    }

    pub fn assert_failure(&self) -> &Self {
        if self.success {
            panic!(
                "Command succeeded but was expected to fail\nSTDOUT:\n{}\nSTDERR:\n{}",
                self.stdout, self.stderr
            );
        }
        self
    }

    pub fn assert_contains(&self, text: &str) -> &Self {
        if !self.stdout.contains(text) && !self.stderr.contains(text) {
            panic!(
                "Output does not contain '{}'\nSTDOUT:\n{}\nSTDERR:\n{}",
                text, self.stdout, self.stderr
            );
        }
        self
    }

    pub fn assert_stdout_contains(&self, text: &str) -> &Self {
        if !self.stdout.contains(text) {
            panic!("STDOUT does not contain '{}'\nSTDOUT:\n{}", text, self.stdout);
        }
        self
    }

    /// Parse stdout as JSON
    pub fn json(&self) -> serde_json::Value {
        serde_json::from_str(&self.stdout)
            .unwrap_or_else(|e| panic!("STDOUT is not JSON ({}):\n{}", e, self.stdout))
    }
}
