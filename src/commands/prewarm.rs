//! # Prewarm Command Implementation
//!
//! Clones (or refreshes) every repository listed under `large_repos` so the
//! first `/sync` against it does not pay for the clone.

use anyhow::{Context, Result};
use clap::Args;
use sync_bot::Config;

/// Clone or refresh every configured large repository
#[derive(Args, Debug)]
pub struct PrewarmArgs {}

/// Execute the `prewarm` command.
pub fn execute(_args: PrewarmArgs, config: &Config) -> Result<()> {
    if config.large_repos.is_empty() {
        println!("No large repositories configured.");
        return Ok(());
    }
    let client = super::client(config)?;
    client
        .prewarm_large_repos()
        .context("Prewarming large repositories failed")?;
    for large in client.large_repos().iter() {
        println!("{}", client.repo_dir(large.owner(), large.repo()).display());
    }
    Ok(())
}
