//! ops-runner: run templated automation scripts as logged jobs

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing::Level;

mod commands;
mod settings;

#[derive(Parser)]
#[command(name = "ops-runner")]
#[command(about = "Run templated automation scripts as timed, logged jobs")]
#[command(version)]
struct Cli {
    /// Configuration file path [default: ops-runner.yaml, built-in defaults if absent]
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a template as a job and wait for it to finish
    Submit {
        /// Template file name in the catalog
        template: String,

        /// Injection value; non-JSON values are taken as plain strings
        #[arg(long = "set", value_name = "NAME=JSON")]
        set: Vec<String>,

        /// JSON file holding an object of injection values
        #[arg(long, value_name = "FILE")]
        values: Option<PathBuf>,

        /// Print the outcome as JSON
        #[arg(long)]
        json: bool,
    },

    /// Run a named task with its single value
    Task {
        /// Task name (see `tasks`)
        name: String,

        /// Value for the task's injection point, as JSON
        value: String,

        /// Print the outcome as JSON
        #[arg(long)]
        json: bool,
    },

    /// Print the log of a job
    Log {
        /// Job id returned by `submit` or `task`
        job_id: String,
    },

    /// List catalog templates and the values they accept
    Templates,

    /// List task aliases
    Tasks,

    /// Validate configuration file
    Validate,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = if cli.verbose { Level::DEBUG } else { Level::INFO };
    tracing_subscriber::fmt()
        .with_target(false)
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .init();

    let Cli {
        config, command, ..
    } = cli;

    smol::block_on(async move {
        let config = config.as_deref();
        match command {
            Commands::Submit {
                template,
                set,
                values,
                json,
            } => commands::submit::run(config, &template, &set, values.as_deref(), json).await,
            Commands::Task { name, value, json } => {
                commands::task::run(config, &name, &value, json).await
            }
            Commands::Log { job_id } => commands::log::run(config, &job_id).await,
            Commands::Templates => commands::templates::run(config).await,
            Commands::Tasks => commands::tasks::run(config).await,
            Commands::Validate => commands::validate::run(config).await,
        }
    })
}
