//! stakegov daemon: operator CLI and periodic proposal sweep.

mod cli;
mod commands;
mod config;
mod service;

use clap::Parser;
use cli::{Cli, Command};
use commands::CommandError;
use config::DaemonConfig;
use stakegov_types::Timestamp;

/// File config as the base, CLI flags and env vars on top.
fn load_config(cli: &Cli) -> anyhow::Result<DaemonConfig> {
    let mut config = match &cli.config {
        Some(path) => DaemonConfig::from_toml_file(path)?,
        None => DaemonConfig::default(),
    };
    if let Some(dir) = &cli.data_dir {
        config.data_dir = dir.clone();
    }
    if let Some(file) = &cli.holdings_file {
        config.holdings_file = Some(file.clone());
    }
    if let Some(level) = &cli.log_level {
        config.log_level = level.clone();
    }
    if let Some(format) = cli.log_format {
        config.log_format = format;
    }
    if let Command::Run {
        sweep_interval_secs,
        auto_activate,
    } = &cli.command
    {
        if let Some(secs) = sweep_interval_secs {
            config.sweep_interval_secs = *secs;
        }
        config.auto_activate |= *auto_activate;
    }
    Ok(config)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = load_config(&cli)?;
    stakegov_utils::init_tracing(&config.log_level, config.log_format);
    if let Some(path) = &cli.config {
        tracing::info!(path = %path.display(), "loaded config");
    }

    let engine = commands::build_engine(&config)?;
    let now = cli.at.map(Timestamp::new).unwrap_or_else(Timestamp::now);

    match cli.command {
        Command::Run { .. } => service::run(engine, config).await,
        Command::Once(request) => {
            let mutates = request.mutates();
            let result = commands::execute(&engine, request, now);
            // Persist even on rejection: activating into an empty pool
            // fails the proposal and reports an error.
            if mutates {
                commands::persist(&engine, &config)?;
            }
            match result {
                Ok(body) => {
                    println!("{}", serde_json::to_string_pretty(&body)?);
                    Ok(())
                }
                Err(CommandError::Render(e)) => Err(e.into()),
                Err(CommandError::Rejected(e)) => {
                    if e.is_programming_error() {
                        tracing::error!(kind = e.kind(), error = %e, "request failed");
                    }
                    println!("{}", serde_json::to_string_pretty(&commands::rejection(&e))?);
                    std::process::exit(1);
                }
            }
        }
    }
}
