//! # Clone Command Implementation

use anyhow::{Context, Result};
use clap::Args;
use sync_bot::config::split_repo_id;
use sync_bot::Config;

/// Clone or refresh one repository and print its working directory
#[derive(Args, Debug)]
pub struct CloneArgs {
    /// Repository as owner/repo
    #[arg(value_name = "OWNER/REPO")]
    pub repository: String,
}

/// Execute the `clone` command.
pub fn execute(args: CloneArgs, config: &Config) -> Result<()> {
    let (owner, repo) = split_repo_id(&args.repository)?;
    let client = super::client(config)?;
    let wc = client
        .clone_repo(owner, repo)
        .with_context(|| format!("Failed to clone {}", args.repository))?;
    println!("{}", wc.directory().display());
    Ok(())
}
