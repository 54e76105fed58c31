//! # CLI Command Implementations
//!
//! Each subcommand of the `sync-bot` tool lives in its own file, with an
//! `Args` struct derived using `clap` and an `execute` function that calls
//! into the `sync_bot` library.

pub mod clone;
pub mod pick;
pub mod prewarm;

use anyhow::{Context, Result};
use sync_bot::{Client, Config};

/// Build a client for the system git from the loaded configuration.
pub(crate) fn client(config: &Config) -> Result<Client> {
    Client::new(config).context("Failed to set up git client")
}
