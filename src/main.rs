use clap::Parser;
use eyre::{Context, Result};
use log::info;
use std::fs;

mod cli;
mod commands;
mod config;

use cli::{Cli, Commands};
use config::Config;

fn setup_logging(config: &Config) -> Result<()> {
    // RUST_LOG env var takes precedence, otherwise use config log_level
    let mut builder = env_logger::Builder::new();

    if std::env::var("RUST_LOG").is_ok() {
        builder.parse_default_env();
    } else {
        builder.filter_level(config.log_level.as_filter());
    }

    if let Some(path) = &config.log_file {
        let log_file = Config::expand_path(path);
        if let Some(parent) = log_file.parent() {
            fs::create_dir_all(parent).context("Failed to create log directory")?;
        }

        let target = Box::new(
            fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(&log_file)
                .context("Failed to open log file")?,
        );
        builder.target(env_logger::Target::Pipe(target));
        builder.init();
        info!("Logging initialized, writing to: {}", log_file.display());
    } else {
        builder.target(env_logger::Target::Stderr);
        builder.init();
    }

    info!(
        "Log level: {} (from {})",
        config.log_level.as_filter(),
        if std::env::var("RUST_LOG").is_ok() { "RUST_LOG env" } else { "config" }
    );
    Ok(())
}

fn run(cli: Cli, config: Config) -> Result<()> {
    match cli.command {
        Commands::Replay { input, follow, levels } => commands::replay::run(&input, follow, &levels, &config),
        Commands::Levels { format } => commands::levels::run(cli::OutputFormat::resolve(format), &config),
        Commands::Completions { shell } => commands::completions::run(shell),
    }
}

fn main() -> Result<()> {
    // Parse CLI arguments first
    let cli = Cli::parse();

    // Load configuration (before logging, so log messages in Config::load are silent)
    let config = Config::load(cli.config.as_ref()).context("Failed to load configuration")?;

    setup_logging(&config).context("Failed to setup logging")?;

    info!("Starting monlog with config from: {:?}", cli.config);

    run(cli, config).context("Command failed")?;

    Ok(())
}
