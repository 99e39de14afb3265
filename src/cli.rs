//! CLI definitions for cronsync.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// cronsync CLI.
#[derive(Parser)]
#[command(name = "cronsync")]
#[command(about = "Dynamic cron scheduler that keeps persisted jobs and the engine in sync")]
#[command(version)]
pub(crate) struct Cli {
    /// Configuration file path
    #[arg(short, long, default_value = "config/default.toml", global = true)]
    pub config: PathBuf,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub(crate) enum Commands {
    /// Run the scheduler and admin API in foreground (default)
    Run {
        /// Admin API host (overrides server.host)
        #[arg(long)]
        host: Option<String>,

        /// Admin API port (overrides server.port)
        #[arg(long)]
        port: Option<u16>,
    },

    /// Load and validate the configuration, then exit
    Check,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_to_no_subcommand() {
        let cli = Cli::try_parse_from(["cronsync"]).unwrap();
        assert_eq!(cli.config, PathBuf::from("config/default.toml"));
        assert!(cli.command.is_none());
    }

    #[test]
    fn test_run_overrides() {
        let cli =
            Cli::try_parse_from(["cronsync", "run", "--port", "9090", "-c", "cron.toml"]).unwrap();
        assert_eq!(cli.config, PathBuf::from("cron.toml"));
        match cli.command {
            Some(Commands::Run { host, port }) => {
                assert!(host.is_none());
                assert_eq!(port, Some(9090));
            }
            _ => panic!("expected run"),
        }
    }

    #[test]
    fn test_check() {
        let cli = Cli::try_parse_from(["cronsync", "check"]).unwrap();
        assert!(matches!(cli.command, Some(Commands::Check)));
    }
}
