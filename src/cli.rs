//! CLI argument parsing and command dispatch

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use sync_bot::Config;

use crate::commands;

/// Sync Bot - Cherry-pick pull requests onto other branches
#[derive(Parser, Debug)]
#[command(name = "sync-bot")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    command: Commands,

    /// Path to the configuration file
    #[arg(long, global = true, value_name = "FILE", env = "SYNC_BOT_CONFIG")]
    config: Option<PathBuf>,

    /// Set log level (error, warn, info, debug, trace)
    #[arg(long, global = true, value_name = "LEVEL", default_value = "info")]
    log_level: String,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Clone or refresh every configured large repository
    Prewarm(commands::prewarm::PrewarmArgs),

    /// Clone or refresh one repository and print its working directory
    Clone(commands::clone::CloneArgs),

    /// Cherry-pick a pull request onto one or more branches
    Pick(commands::pick::PickArgs),
}

impl Cli {
    /// Execute the CLI command
    pub fn execute(self) -> Result<()> {
        init_logging(&self.log_level)?;
        let config = match &self.config {
            Some(path) => Config::load(path)
                .with_context(|| format!("Failed to load config from {}", path.display()))?,
            None => Config::default(),
        };

        match self.command {
            Commands::Prewarm(args) => commands::prewarm::execute(args, &config),
            Commands::Clone(args) => commands::clone::execute(args, &config),
            Commands::Pick(args) => commands::pick::execute(args, &config),
        }
    }
}

/// `RUST_LOG` takes precedence over `--log-level`.
fn init_logging(level: &str) -> Result<()> {
    let level: log::LevelFilter = level
        .parse()
        .with_context(|| format!("Invalid log level: {}", level))?;
    env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .format_timestamp(None)
        .try_init()
        .context("Failed to initialise logging")
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_pick() {
        let cli = Cli::try_parse_from([
            "sync-bot", "pick", "o/r", "--pr", "3", "--source", "fix", "--first", "a",
            "--last", "b", "--onto", "x", "--onto", "y", "--no-push",
        ])
        .unwrap();
        match cli.command {
            Commands::Pick(args) => {
                assert_eq!(args.repository, "o/r");
                assert_eq!(args.onto, vec!["x", "y"]);
                assert!(args.no_push);
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_pick_requires_target() {
        let result = Cli::try_parse_from([
            "sync-bot", "pick", "o/r", "--pr", "3", "--source", "fix", "--first", "a",
            "--last", "b",
        ]);
        assert!(result.is_err());
    }
}
