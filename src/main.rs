//! cronsync - dynamic cron scheduler
//!
//! Main entry point for the cronsync CLI and server.

mod cli;
mod server;

use std::path::Path;

use clap::Parser;

use cronsync_config::{Config, ConfigLoader, ConfigValidator};

use crate::cli::{Cli, Commands};
use crate::server::{init_tracing, run_server};

fn load_config(path: &Path) -> anyhow::Result<Config> {
    Ok(ConfigLoader::load_or_default(&ConfigLoader::expand_path(path))?)
}

/// Print validation findings. Returns whether the configuration is usable.
fn check_config(path: &Path) -> anyhow::Result<bool> {
    let config = load_config(path)?;
    let result = ConfigValidator::validate(&config)?;

    for warning in &result.warnings {
        println!("warning: {}: {}", warning.path, warning.message);
    }
    for err in &result.errors {
        eprintln!("error: {}: {}", err.path, err.message);
    }

    if result.is_valid() {
        println!("{}: ok", path.display());
    }
    Ok(result.is_valid())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Some(Commands::Check) => {
            if !check_config(&cli.config)? {
                std::process::exit(1);
            }
            Ok(())
        }
        Some(Commands::Run { host, port }) => {
            let mut config = load_config(&cli.config)?;
            if let Some(host) = host {
                config.server.host = host;
            }
            if let Some(port) = port {
                config.server.port = port;
            }
            init_tracing(&config.logging)?;
            run_server(config).await
        }
        None => {
            let config = load_config(&cli.config)?;
            init_tracing(&config.logging)?;
            run_server(config).await
        }
    }
}
