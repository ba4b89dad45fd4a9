//! Teller - banking dashboard workflows in the terminal
//!
//! Main entry point for the Teller CLI.

mod cli;
mod cmd_config;
mod cmd_run;
mod shell;

use anyhow::Context;
use clap::Parser;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use teller_config::{ConfigLoader, LoggingConfig};

use crate::cli::{Cli, Commands};

fn init_tracing(logging: &LoggingConfig) -> anyhow::Result<()> {
    std::fs::create_dir_all(&logging.directory).with_context(|| {
        format!("creating log directory {}", logging.directory.display())
    })?;

    let file_appender = RollingFileAppender::builder()
        .rotation(Rotation::DAILY)
        .filename_prefix(&logging.file_prefix)
        .max_log_files(30)
        .build(&logging.directory)?;
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    // Keeps the background writer alive for the program duration.
    static GUARD: std::sync::OnceLock<tracing_appender::non_blocking::WorkerGuard> =
        std::sync::OnceLock::new();
    let _ = GUARD.set(guard);

    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&logging.level));

    // Stdout belongs to the console shell; logs go to stderr.
    tracing_subscriber::registry()
        .with(env_filter)
        .with(logging.json.then(|| {
            fmt::layer()
                .json()
                .with_writer(std::io::stderr)
        }))
        .with((!logging.json).then(|| {
            fmt::layer()
                .with_target(true)
                .with_ansi(true)
                .with_writer(std::io::stderr)
        }))
        .with(
            fmt::layer()
                .with_writer(non_blocking)
                .with_ansi(false),
        )
        .init();

    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = ConfigLoader::load_or_default(cli.config.as_deref())?;

    init_tracing(&config.logging)?;

    match cli.command {
        Commands::List { format } => cmd_run::list_workflows(&config, &format),
        Commands::Run {
            workflow_id,
            params,
        } => cmd_run::run_workflow(&config, &workflow_id, &params).await,
        Commands::Config { action } => cmd_config::handle_config_command(action, &config),
    }
}
