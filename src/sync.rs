//! # Sync Orchestration
//!
//! Fans a pull request out to a list of target branches. For every target
//! the pipeline runs
//!
//! ```text
//! CLEAN → CHECKED_OUT_TARGET → BRANCHED → PR_FETCHED → CHERRY_PICKED → PUSHED → PR_OPENED
//! ```
//!
//! and stops at the first failing stage. A failure on one target never
//! affects the others; each ends with its own [`BranchOutcome`] in the
//! returned [`SyncReport`].
//!
//! The hosting platform is reached through the [`Platform`] trait. Without
//! one, branch existence is checked with `git ls-remote` and no pull
//! requests are opened.

use std::collections::HashSet;
use std::fmt;

use log::{error, info, warn};

use crate::client::Client;
use crate::command::{is_sync_branch, sync_branch_name};
use crate::error::{Error, Result};
use crate::repo::{MergeOption, Strategy, WorkingCopy};

/// The hosting-platform operations the sync pipeline needs.
pub trait Platform: Send + Sync {
    /// Names of all branches of `owner/repo`.
    fn branches(&self, owner: &str, repo: &str) -> Result<Vec<String>>;

    /// Open a pull request and return its URL.
    fn create_pull_request(&self, request: &NewPullRequest) -> Result<String>;
}

/// A pull request to be opened against `owner/repo`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewPullRequest {
    pub owner: String,
    pub repo: String,
    pub title: String,
    pub body: String,
    /// Source branch, `fork_owner:branch` when it lives in a fork.
    pub head: String,
    pub base: String,
    /// `fork_owner/repo` for pull requests opened from a fork.
    pub fork_path: Option<String>,
    /// Delete the source branch once the pull request is merged.
    pub prune_source_branch: bool,
}

/// Everything needed to replay one pull request onto other branches.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PickRequest {
    pub owner: String,
    pub repo: String,
    pub number: u64,
    /// Head branch of the pull request; part of the sync branch name.
    pub source_branch: String,
    /// First and last commit of the range to cherry-pick.
    pub first: String,
    pub last: String,
    pub targets: Vec<String>,
    pub strategy: Option<Strategy>,
    pub title: String,
    pub body: String,
    /// Push the sync branch and open its pull request. When false, stop after
    /// cherry-picking and leave the result in the working copy.
    pub push: bool,
}

/// Pipeline stage a target branch is in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Clean,
    CheckedOutTarget,
    Branched,
    PrFetched,
    CherryPicked,
    Pushed,
    PrOpened,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::Clean => "prepare working copy",
            Stage::CheckedOutTarget => "checkout",
            Stage::Branched => "create sync branch",
            Stage::PrFetched => "fetch pull request",
            Stage::CherryPicked => "cherry-pick",
            Stage::Pushed => "push",
            Stage::PrOpened => "create pull request",
        };
        f.write_str(name)
    }
}

/// How syncing to one target branch ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BranchOutcome {
    /// The target branch does not exist.
    NotFound,
    /// A pull request was opened; carries its URL.
    Created(String),
    /// The sync branch was pushed; no platform to open a pull request on.
    Pushed,
    /// Commits were picked locally and not pushed.
    Picked,
    /// The commits conflict with the target under both strategies.
    SyncFailed,
    /// A pipeline step failed.
    StepFailed(Stage, String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BranchReport {
    pub branch: String,
    pub outcome: BranchOutcome,
}

impl fmt::Display for BranchReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.outcome {
            BranchOutcome::NotFound => write!(f, "{}: branch does not exist", self.branch),
            BranchOutcome::Created(url) => write!(f, "{}: created {}", self.branch, url),
            BranchOutcome::Pushed => write!(f, "{}: pushed", self.branch),
            BranchOutcome::Picked => write!(f, "{}: picked, not pushed", self.branch),
            BranchOutcome::SyncFailed => write!(f, "{}: synchronization failed", self.branch),
            BranchOutcome::StepFailed(stage, message) => {
                write!(f, "{}: {} failed: {}", self.branch, stage, message)
            }
        }
    }
}

/// Per-branch results of one sync, in target order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SyncReport {
    pub branches: Vec<BranchReport>,
}

impl SyncReport {
    pub fn outcome(&self, branch: &str) -> Option<&BranchOutcome> {
        self.branches
            .iter()
            .find(|r| r.branch == branch)
            .map(|r| &r.outcome)
    }
}

impl fmt::Display for SyncReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for report in &self.branches {
            writeln!(f, "{}", report)?;
        }
        Ok(())
    }
}

type StageResult<T> = std::result::Result<T, (Stage, Error)>;

trait AtStage<T> {
    fn at(self, stage: Stage) -> StageResult<T>;
}

impl<T> AtStage<T> for Result<T> {
    fn at(self, stage: Stage) -> StageResult<T> {
        self.map_err(|e| (stage, e))
    }
}

/// Drives working copies through the sync pipeline.
pub struct Syncer<'a> {
    client: &'a Client,
    platform: Option<&'a dyn Platform>,
}

impl<'a> Syncer<'a> {
    pub fn new(client: &'a Client) -> Self {
        Self {
            client,
            platform: None,
        }
    }

    pub fn with_platform(mut self, platform: &'a dyn Platform) -> Self {
        self.platform = Some(platform);
        self
    }

    /// Cherry-pick `first^..last` of a pull request onto every target.
    pub fn pick(&self, request: &PickRequest) -> Result<SyncReport> {
        let wc = self.client.clone_repo(&request.owner, &request.repo)?;
        let known = match self.platform {
            Some(platform) => Some(
                platform
                    .branches(&request.owner, &request.repo)?
                    .into_iter()
                    .collect::<HashSet<_>>(),
            ),
            None => None,
        };

        Ok(self.pick_targets(&wc, request, known.as_ref()))
    }

    fn pick_targets(
        &self,
        wc: &WorkingCopy,
        request: &PickRequest,
        known: Option<&HashSet<String>>,
    ) -> SyncReport {
        let mut report = SyncReport::default();
        for target in &request.targets {
            let exists = match known {
                Some(known) => Ok(known.contains(target)),
                None => wc
                    .upstream_url()
                    .map(|url| wc.remote_branch_exists_in(&url, target)),
            };
            let outcome = match exists {
                Ok(true) => self.pick_onto(wc, request, target),
                Ok(false) => BranchOutcome::NotFound,
                Err(e) => {
                    error!("looking up {} failed: {}", target, e);
                    BranchOutcome::StepFailed(Stage::CheckedOutTarget, e.to_string())
                }
            };
            info!("{}/{} -> {}: {:?}", request.owner, request.repo, target, outcome);
            report.branches.push(BranchReport {
                branch: target.clone(),
                outcome,
            });
        }
        report
    }

    fn pick_onto(&self, wc: &WorkingCopy, request: &PickRequest, target: &str) -> BranchOutcome {
        match self.run_pipeline(wc, request, target) {
            Ok(outcome) => outcome,
            Err((_, Error::SyncFailed { range, output })) => {
                error!("Cherry pick {} onto {} failed: {}", range, target, output);
                BranchOutcome::SyncFailed
            }
            Err((stage, e)) => {
                error!("{} for {} failed: {}", stage, target, e);
                BranchOutcome::StepFailed(stage, e.to_string())
            }
        }
    }

    fn run_pipeline(
        &self,
        wc: &WorkingCopy,
        request: &PickRequest,
        target: &str,
    ) -> StageResult<BranchOutcome> {
        if wc.is_fork_backed() {
            self.refresh_fork_branch(wc, target)?;
        } else {
            if let Err(e) = wc.clean() {
                warn!("clean before checkout failed: {}", e);
            }
            wc.checkout(&format!("origin/{}", target))
                .at(Stage::CheckedOutTarget)?;
        }

        let sync_branch = sync_branch_name(request.number, &request.source_branch, target);
        wc.checkout_new_branch(&sync_branch, true)
            .at(Stage::Branched)?;
        wc.fetch_pull_request(request.number)
            .at(Stage::PrFetched)?;
        wc.cherry_pick(&request.first, &request.last, request.strategy)
            .at(Stage::CherryPicked)?;
        if !request.push {
            return Ok(BranchOutcome::Picked);
        }
        wc.push(&sync_branch, true).at(Stage::Pushed)?;

        let Some(platform) = self.platform else {
            return Ok(BranchOutcome::Pushed);
        };
        let (head, fork_path) = if wc.is_fork_backed() {
            (
                format!("{}:{}", wc.remote_owner(), sync_branch),
                Some(format!("{}/{}", wc.remote_owner(), wc.repo())),
            )
        } else {
            (sync_branch, None)
        };
        let pr = NewPullRequest {
            owner: request.owner.clone(),
            repo: request.repo.clone(),
            title: request.title.clone(),
            body: request.body.clone(),
            head,
            base: target.to_string(),
            fork_path,
            prune_source_branch: true,
        };
        let url = self
            .client
            .retry_policy()
            .retry(
                |attempt| {
                    info!(
                        "Create pull request {} -> {} (attempt {})",
                        pr.head, pr.base, attempt
                    );
                    platform.create_pull_request(&pr)
                },
                |_| true,
            )
            .at(Stage::PrOpened)?;
        Ok(BranchOutcome::Created(url))
    }

    /// Bring the fork's copy of `target` up to date with the canonical
    /// repository, creating it in the fork first if needed, and leave it
    /// checked out.
    fn refresh_fork_branch(&self, wc: &WorkingCopy, target: &str) -> StageResult<()> {
        if !wc.has_remote("upstream").at(Stage::Clean)? {
            let upstream = wc.upstream_url().at(Stage::Clean)?;
            wc.add_remote("upstream", &upstream).at(Stage::Clean)?;
        }
        if let Err(e) = wc.clean() {
            warn!("clean before checkout failed: {}", e);
        }

        let in_fork = match self.platform {
            Some(platform) => platform
                .branches(wc.remote_owner(), wc.repo())
                .at(Stage::Clean)?
                .iter()
                .any(|b| b == target),
            None => wc.remote_branch_exists(target),
        };
        if !in_fork {
            info!("Creating {} in fork {}", target, wc.remote_owner());
            wc.fetch_upstream(target).at(Stage::Clean)?;
            wc.create_branch_and_push_to_origin(target, &format!("upstream/{}", target))
                .at(Stage::Clean)?;
        }

        wc.checkout(&format!("origin/{}", target))
            .at(Stage::CheckedOutTarget)?;
        wc.fetch_upstream(target).at(Stage::CheckedOutTarget)?;
        wc.merge_upstream(target).at(Stage::CheckedOutTarget)?;
        wc.push_upstream_to_origin(target)
            .at(Stage::CheckedOutTarget)?;
        Ok(())
    }

    /// Fast-forward merge pull request `number` into `target` and force-push
    /// the result.
    pub fn auto_merge(&self, owner: &str, repo: &str, number: u64, target: &str) -> Result<()> {
        let wc = self.client.clone_repo(owner, repo)?;
        wc.fetch_pull_request(number)?;
        // Leaves `target` checked out as a local branch at origin's tip.
        wc.checkout(&format!("origin/{}", target))?;

        let pull = format!("origin/pull/{}", number);
        let merge_request = format!("origin/merge-requests/{}", number);
        let head = if wc.rev_parse(&pull).is_ok() {
            pull
        } else {
            merge_request
        };
        wc.merge(&head, MergeOption::FastForward)?;
        wc.push(target, true)
    }

    /// Delete a sync branch from origin after its pull request closed.
    /// Returns whether a branch was deleted.
    pub fn close_sync_branch(&self, owner: &str, repo: &str, branch: &str) -> Result<bool> {
        if !is_sync_branch(branch) {
            warn!("{} is not a sync branch, leaving it alone.", branch);
            return Ok(false);
        }
        let wc = self.client.clone_repo(owner, repo)?;
        if !wc.remote_branch_exists(branch) {
            warn!("Source branch {} not found.", branch);
            return Ok(false);
        }
        wc.delete_remote_branch(branch)?;
        Ok(true)
    }
}
