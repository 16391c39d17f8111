//! Tool Probe - test registered tools and record verified results
//!
//! This CLI runs a tool's test endpoint with operator-supplied parameters,
//! shows the outcome and, once the operator confirms, saves the verified
//! parameter/result pair back to the registry.

#![allow(clippy::uninlined_format_args)]

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod cli;
mod commands;
mod config;
mod paths;
mod utils;

use cli::{Cli, Commands};
use config::Config;
use paths::ToolProbePaths;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let paths = ToolProbePaths::new()?;

    let config_path = cli
        .config
        .clone()
        .unwrap_or_else(|| paths.default_config_file());
    let config = match Config::load_from_file(&config_path) {
        Ok(config) => config,
        // `config init --force` must be able to replace a broken file.
        Err(err) if matches!(cli.command, Commands::Config(_)) => {
            eprintln!("⚠️  {:#}; using defaults", err);
            Config::default()
        }
        Err(err) => return Err(err),
    }
    .with_overrides(&cli);

    init_logging(&paths, &config, cli.verbose)?;

    tracing::info!("Tool Probe starting up");
    tracing::debug!("Command: {:?}", cli.command);
    tracing::debug!("Configuration loaded from {}", config_path.display());

    match cli.command {
        Commands::Test(args) => commands::test::run(args, &config).await,
        Commands::Import(args) => commands::import::run(args, &config, &paths),
        Commands::Config(args) => commands::config::run(args, &config, &config_path),
    }
}

/// Route all logs to a file so terminal output stays clean
fn init_logging(paths: &ToolProbePaths, config: &Config, verbose: u8) -> Result<()> {
    let directives = match (verbose, config.logging.level.as_deref()) {
        (0, Some(level)) => level,
        (0, None) => "tool_probe=debug,tool_probe_core=debug,info",
        (1, _) => "tool_probe=trace,tool_probe_core=trace,debug",
        _ => "trace",
    };
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| directives.into());

    let log_file_path = config
        .logging
        .file
        .clone()
        .unwrap_or_else(|| paths.log_file("tool-probe"));

    let log_file = std::fs::OpenOptions::new()
        .create(true)
        .write(true)
        .truncate(true)
        .open(&log_file_path)?;

    let file_layer = tracing_subscriber::fmt::layer()
        .with_writer(log_file)
        .with_target(true)
        .with_file(true)
        .with_line_number(true)
        .with_ansi(false);

    tracing_subscriber::registry()
        .with(env_filter)
        .with(file_layer)
        .init();

    tracing::debug!("Logging initialized");
    tracing::info!("Log file: {:?}", log_file_path);

    eprintln!("📄 Logs saved to: {}", log_file_path.display());
    Ok(())
}
