//! # Sync Bot CLI
//!
//! This is the binary entry point for the `sync-bot` command-line tool.
//!
//! Its primary responsibilities are:
//! - Parsing command-line arguments using `clap`.
//! - Setting up logging.
//! - Executing the appropriate command and translating library errors into
//!   user-friendly output.
//!
//! The git handling lives in the `sync_bot` library crate; the binary is a
//! thin wrapper around it.

mod cli;
mod commands;

use anyhow::Result;
use clap::Parser;

fn main() -> Result<()> {
    let cli = cli::Cli::parse();
    cli.execute()
}
