//! # Pick Command Implementation
//!
//! Runs the sync pipeline for one pull request from the command line. There
//! is no platform client here, so target branches are checked with
//! `git ls-remote` and the sync branches are pushed without opening pull
//! requests.

use anyhow::{bail, Context, Result};
use clap::Args;
use sync_bot::config::split_repo_id;
use sync_bot::sync::BranchOutcome;
use sync_bot::{Config, PickRequest, Strategy, Syncer};

/// Cherry-pick a pull request onto one or more branches
#[derive(Args, Debug)]
pub struct PickArgs {
    /// Repository as owner/repo
    #[arg(value_name = "OWNER/REPO")]
    pub repository: String,

    /// Pull request number
    #[arg(long, value_name = "N")]
    pub pr: u64,

    /// Head branch of the pull request, used in the sync branch name
    #[arg(long, value_name = "BRANCH")]
    pub source: String,

    /// First commit of the range to pick
    #[arg(long, value_name = "SHA")]
    pub first: String,

    /// Last commit of the range to pick
    #[arg(long, value_name = "SHA")]
    pub last: String,

    /// Target branch (repeatable)
    #[arg(long, value_name = "BRANCH", required = true)]
    pub onto: Vec<String>,

    /// Conflict strategy tried first (ours, theirs)
    #[arg(long, value_name = "STRATEGY", default_value = "theirs")]
    pub strategy: Strategy,

    /// Pick locally without pushing
    #[arg(long)]
    pub no_push: bool,
}

/// Execute the `pick` command.
pub fn execute(args: PickArgs, config: &Config) -> Result<()> {
    let (owner, repo) = split_repo_id(&args.repository)?;
    let client = super::client(config)?;
    let request = PickRequest {
        owner: owner.to_string(),
        repo: repo.to_string(),
        number: args.pr,
        title: format!("[sync-bot] sync !{} from {}", args.pr, args.source),
        body: format!("Synchronized from {}#{}.", args.repository, args.pr),
        source_branch: args.source,
        first: args.first,
        last: args.last,
        targets: args.onto,
        strategy: Some(args.strategy),
        push: !args.no_push,
    };

    let report = Syncer::new(&client)
        .pick(&request)
        .with_context(|| format!("Failed to sync {}#{}", args.repository, args.pr))?;
    print!("{}", report);

    let failed = report
        .branches
        .iter()
        .filter(|r| !matches!(r.outcome, BranchOutcome::Pushed | BranchOutcome::Picked))
        .count();
    if failed > 0 {
        bail!("{} of {} branches were not synced", failed, report.branches.len());
    }
    Ok(())
}
