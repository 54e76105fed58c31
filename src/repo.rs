//! # Working Copy Operations
//!
//! A [`WorkingCopy`] is one cloned repository under the cache root, handed
//! out by [`crate::client::Client::clone_repo`]. Every operation here is a
//! small recovery ladder around one git command: a checkout blocked by local
//! changes cleans the tree and tries again, a cherry-pick that conflicts is
//! retried with the opposite strategy option, a fetch that trips over the
//! transport narrows and then widens what it asks for.
//!
//! Local commands run once. Anything that talks to a remote goes through the
//! retrying runner.

use std::collections::BTreeSet;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::Arc;

use log::{debug, error, info, warn};
use url::Url;

use crate::classify::FailureKind;
use crate::config::Identity;
use crate::credentials::Credentials;
use crate::error::{Error, Result};
use crate::ladder::climb;
use crate::runner::{run_git, run_git_with_retry, CommandRunner, RetryPolicy};
use crate::secret::de_secret;

/// Log target for automatic conflict resolutions that deserve a human look.
pub const AUDIT_TARGET: &str = "sync_bot::audit";

/// Which side wins a conflicting hunk during cherry-pick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Strategy {
    Ours,
    Theirs,
}

impl Strategy {
    pub fn as_str(self) -> &'static str {
        match self {
            Strategy::Ours => "ours",
            Strategy::Theirs => "theirs",
        }
    }

    pub fn opposite(self) -> Self {
        match self {
            Strategy::Ours => Strategy::Theirs,
            Strategy::Theirs => Strategy::Ours,
        }
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Strategy {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "ours" => Ok(Strategy::Ours),
            "theirs" => Ok(Strategy::Theirs),
            other => Err(Error::InvalidCommand {
                message: format!("unknown strategy option '{}', expected ours or theirs", other),
            }),
        }
    }
}

/// Fast-forward policy for `git merge`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MergeOption {
    #[default]
    FastForward,
    FastForwardOnly,
    NoFastForward,
}

impl MergeOption {
    pub fn as_flag(self) -> &'static str {
        match self {
            MergeOption::FastForward => "--ff",
            MergeOption::FastForwardOnly => "--ff-only",
            MergeOption::NoFastForward => "--no-ff",
        }
    }
}

/// `{base}/{owner}/{repo}.git`, with the credentials embedded when they are
/// complete and the transport is HTTP.
pub(crate) fn remote_url(
    base: &str,
    owner: &str,
    repo: &str,
    credentials: &Credentials,
) -> Result<String> {
    let plain = format!("{}/{}/{}.git", base.trim_end_matches('/'), owner, repo);
    if !credentials.is_complete() {
        return Ok(plain);
    }
    let mut url = Url::parse(&plain)?;
    if !matches!(url.scheme(), "http" | "https") {
        return Ok(plain);
    }
    let invalid = || Error::InvalidRepository {
        name: format!("{}/{}", owner, repo),
    };
    url.set_username(&credentials.user).map_err(|_| invalid())?;
    url.set_password(Some(&credentials.token))
        .map_err(|_| invalid())?;
    Ok(url.into())
}

fn tracking_refspec(remote: &str, branch: &str) -> String {
    format!("+refs/heads/{}:refs/remotes/{}/{}", branch, remote, branch)
}

/// `origin/x` or `upstream/x`, split into remote and branch.
fn split_remote_ref(commit_like: &str) -> Option<(&str, &str)> {
    match commit_like.split_once('/') {
        Some((remote @ ("origin" | "upstream"), branch)) if !branch.is_empty() => {
            Some((remote, branch))
        }
        _ => None,
    }
}

fn other_remote(remote: &str) -> &'static str {
    if remote == "origin" {
        "upstream"
    } else {
        "origin"
    }
}

#[derive(Debug)]
enum CleanStep {
    AsIs,
    AfterClean,
}

#[derive(Debug)]
enum NewBranchStep {
    Checkout,
    MoveRef,
}

#[derive(Debug)]
enum PickStep {
    Requested(Option<Strategy>),
    Reversed(Strategy),
}

#[derive(Debug)]
enum FetchStep {
    Filtered,
    Shallow,
    Full,
}

#[derive(Debug)]
enum PullRef {
    PullRequest,
    MergeRequest,
}

#[derive(Debug)]
enum BranchSource {
    Commit,
    SymbolicRef,
    Origin,
}

/// A local clone of one `owner/repo`.
///
/// Exclusively owned by the caller that obtained it. Concurrent use of the
/// same directory is prevented by the client's per-repository lock, which
/// is held only during the clone itself; callers that run long sequences
/// should not hand the same repository to two threads.
pub struct WorkingCopy {
    pub(crate) dir: PathBuf,
    pub(crate) owner: String,
    pub(crate) repo: String,
    /// Owner of the copy that is cloned and pushed to (a fork for some
    /// large repositories).
    pub(crate) remote_owner: String,
    pub(crate) base_url: String,
    pub(crate) credentials: Credentials,
    pub(crate) identity: Identity,
    pub(crate) retry: RetryPolicy,
    pub(crate) runner: Arc<dyn CommandRunner>,
}

impl fmt::Debug for WorkingCopy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WorkingCopy")
            .field("dir", &self.dir)
            .field("owner", &self.owner)
            .field("repo", &self.repo)
            .field("remote_owner", &self.remote_owner)
            .field("credentials", &self.credentials)
            .finish_non_exhaustive()
    }
}

impl WorkingCopy {
    /// Location of the working copy on disk.
    pub fn directory(&self) -> &Path {
        &self.dir
    }

    pub fn owner(&self) -> &str {
        &self.owner
    }

    pub fn repo(&self) -> &str {
        &self.repo
    }

    pub fn remote_owner(&self) -> &str {
        &self.remote_owner
    }

    /// Whether clones and pushes go through a fork rather than the owner.
    pub fn is_fork_backed(&self) -> bool {
        self.remote_owner != self.owner
    }

    /// Delete the working copy from disk.
    pub fn destroy(self) -> Result<()> {
        info!("Removing {}.", self.dir.display());
        fs::remove_dir_all(&self.dir)?;
        Ok(())
    }

    fn git<S: AsRef<str>>(&self, args: &[S]) -> Result<String> {
        run_git(self.runner.as_ref(), Some(&self.dir), args)
    }

    fn git_remote<S: AsRef<str>>(&self, args: &[S]) -> Result<String> {
        run_git_with_retry(self.runner.as_ref(), &self.retry, Some(&self.dir), args)
    }

    /// URL of the canonical repository, authenticated when possible.
    pub fn upstream_url(&self) -> Result<String> {
        remote_url(&self.base_url, &self.owner, &self.repo, &self.credentials)
    }

    fn push_url(&self, operation: &str) -> Result<String> {
        if !self.credentials.is_complete() {
            return Err(Error::MissingCredentials {
                operation: operation.to_string(),
            });
        }
        remote_url(
            &self.base_url,
            &self.remote_owner,
            &self.repo,
            &self.credentials,
        )
    }

    pub fn status(&self) -> Result<String> {
        info!("Workspace status");
        self.git(&["status"])
    }

    /// Resolve `rev` to a commit hash.
    pub fn rev_parse(&self, rev: &str) -> Result<String> {
        Ok(self.git(&["rev-parse", "--verify", rev])?.trim().to_string())
    }

    /// Abort any cherry-pick in progress, then discard staged, modified and
    /// untracked changes.
    pub fn clean(&self) -> Result<()> {
        info!("Cancelling possible intermediate state of cherry-pick");
        self.abort_quietly();
        info!("reset checkout clean");
        self.git(&["reset", "--"])?;
        self.git(&["checkout", "--", "."])?;
        self.git(&["clean", "-df"])?;
        Ok(())
    }

    fn abort_quietly(&self) {
        if let Err(e) = self.git(&["cherry-pick", "--abort"]) {
            debug!("cherry-pick --abort: {}", e);
        }
    }

    /// Check out a local ref, or `origin/<branch>` / `upstream/<branch>` as a
    /// local branch of the same name.
    pub fn checkout(&self, commit_like: &str) -> Result<()> {
        info!("Checkout {}.", commit_like);
        match split_remote_ref(commit_like) {
            Some((remote, branch)) => self.checkout_remote(remote, branch),
            None => self.checkout_cleaning(&["checkout", commit_like]),
        }
    }

    fn checkout_remote(&self, remote: &str, branch: &str) -> Result<()> {
        let remote = if self.remote_branch_exists_in(remote, branch) {
            remote
        } else if self.remote_branch_exists_in(other_remote(remote), branch) {
            warn!(
                "{} not found on {}, using {}",
                branch,
                remote,
                other_remote(remote)
            );
            other_remote(remote)
        } else {
            error!("remote branch {}/{} not found before checkout", remote, branch);
            return Err(Error::BranchNotFound {
                remote: remote.to_string(),
                branch: branch.to_string(),
            });
        };

        if let Err(e) = self.disable_partial_clone() {
            debug!("disable partial clone: {}", e);
        }

        if let Err(e) = self.fetch_refspec_robust(remote, &tracking_refspec(remote, branch)) {
            if remote == "origin" && self.remote_branch_exists_in("upstream", branch) {
                warn!("fetch origin/{} failed, falling back to upstream: {}", branch, e);
                self.fetch_refspec_robust("upstream", &tracking_refspec("upstream", branch))
                    .map_err(|_| e)?;
                let tracking = format!("upstream/{}", branch);
                return self.checkout_cleaning(&["checkout", "-B", branch, &tracking]);
            }
            error!("fetch {}/{} before checkout failed: {}", remote, branch, e);
            return Err(e);
        }

        let tracking = format!("{}/{}", remote, branch);
        self.checkout_cleaning(&["checkout", "-B", branch, &tracking])
    }

    /// Run a checkout; if local changes are in the way, clean and run it once
    /// more.
    fn checkout_cleaning(&self, args: &[&str]) -> Result<()> {
        climb(
            &[CleanStep::AsIs, CleanStep::AfterClean],
            |step| {
                if let CleanStep::AfterClean = step {
                    self.clean()?;
                }
                self.git(args).map(drop)
            },
            |_, e| e.kind() == FailureKind::DirtyState,
        )
    }

    /// Whether `branch` exists on origin.
    pub fn remote_branch_exists(&self, branch: &str) -> bool {
        self.remote_branch_exists_in("origin", branch)
    }

    pub fn remote_branch_exists_in(&self, remote: &str, branch: &str) -> bool {
        info!("Checking if branch {} exists in {}.", branch, de_secret(remote));
        self.git(&["ls-remote", "--exit-code", "--heads", remote, branch])
            .is_ok()
    }

    /// Create `name` at HEAD and switch to it. With `force`, an existing
    /// branch of that name is deleted first.
    pub fn checkout_new_branch(&self, name: &str, force: bool) -> Result<()> {
        if force {
            if let Err(e) = self.delete_branch(name, true) {
                debug!("delete branch {}: {}", name, e);
            }
        }
        info!("Create and checkout {}.", name);
        let head_ref = format!("refs/heads/{}", name);
        climb(
            &[NewBranchStep::Checkout, NewBranchStep::MoveRef],
            |step| match step {
                NewBranchStep::Checkout => self.git(&["checkout", "-b", name]).map(drop),
                // The tree cannot be written out; point a branch at the current
                // commit and attach HEAD to it without touching files.
                NewBranchStep::MoveRef => {
                    let sha = self.rev_parse("HEAD")?;
                    self.git(&["update-ref", &head_ref, &sha])?;
                    self.git(&["symbolic-ref", "HEAD", &head_ref]).map(drop)
                }
            },
            |_, e| e.kind() == FailureKind::DirtyState,
        )
    }

    pub fn delete_branch(&self, branch: &str, force: bool) -> Result<()> {
        if force {
            self.git(&["branch", "--delete", "--force", branch])?;
        } else {
            self.git(&["branch", "--delete", branch])?;
        }
        Ok(())
    }

    /// Cherry-pick the inclusive range `first^..last` with `-x`.
    ///
    /// A range that conflicts is aborted and retried once with the opposite
    /// strategy option (`ours` when none was given). That resolution is
    /// logged on [`AUDIT_TARGET`]. A range that conflicts both ways fails
    /// with [`Error::SyncFailed`].
    pub fn cherry_pick(&self, first: &str, last: &str, strategy: Option<Strategy>) -> Result<()> {
        self.ensure_identity()?;
        let range = format!("{}^..{}", first, last);
        info!("Cherry pick {} in {}.", range, self.dir.display());

        let reversed = strategy.map(Strategy::opposite).unwrap_or(Strategy::Ours);
        let steps = [PickStep::Requested(strategy), PickStep::Reversed(reversed)];
        climb(
            &steps,
            |step| match *step {
                PickStep::Requested(option) => self.pick_range(&range, option),
                PickStep::Reversed(option) => {
                    warn!(
                        target: AUDIT_TARGET,
                        "{}/{}: cherry-pick {} conflicted with strategy {}, resolving with -X {}",
                        self.owner,
                        self.repo,
                        range,
                        strategy.map_or("none", Strategy::as_str),
                        option
                    );
                    self.pick_range(&range, Some(option))
                }
            },
            |_, e| e.kind() == FailureKind::Conflict,
        )
        .map_err(|e| {
            error!("Cherry pick {} failed: {}", range, e);
            if e.kind() == FailureKind::Conflict {
                Error::SyncFailed {
                    range: range.clone(),
                    output: e.output().unwrap_or_default().to_string(),
                }
            } else {
                e
            }
        })
    }

    /// One cherry-pick attempt. A dirty tree is cleaned and the pick retried
    /// once; whatever fails is aborted before returning.
    fn pick_range(&self, range: &str, strategy: Option<Strategy>) -> Result<()> {
        let mut args = vec!["cherry-pick", "-x"];
        if let Some(strategy) = strategy {
            args.extend(["-X", strategy.as_str()]);
        }
        args.push(range);

        let result = climb(
            &[CleanStep::AsIs, CleanStep::AfterClean],
            |step| {
                if let CleanStep::AfterClean = step {
                    self.abort_quietly();
                    self.clean()?;
                }
                self.git(&args).map(drop)
            },
            |_, e| e.kind() == FailureKind::DirtyState,
        );
        if result.is_err() {
            self.abort_quietly();
        }
        result
    }

    pub fn cherry_pick_abort(&self) -> Result<()> {
        info!("Cherry pick abort.");
        self.git(&["cherry-pick", "--abort"]).map(drop)
    }

    /// Push `branch` to the remote copy over an authenticated URL.
    pub fn push(&self, branch: &str, force: bool) -> Result<()> {
        let remote = self.push_url("push")?;
        info!(
            "Pushing to '{}/{} (branch: {})'.",
            self.remote_owner, self.repo, branch
        );
        let mut args = vec!["push"];
        if force {
            args.push("--force");
        }
        args.extend([remote.as_str(), branch]);
        self.git_remote(&args)
            .map(drop)
            .inspect_err(|e| error!("Pushing failed: {}", e))
    }

    pub fn delete_remote_branch(&self, branch: &str) -> Result<()> {
        let remote = self.push_url("delete a remote branch")?;
        info!(
            "Delete remote branch '{}/{} (branch: {})'.",
            self.remote_owner, self.repo, branch
        );
        self.git_remote(&["push", remote.as_str(), "--delete", branch])
            .map(drop)
            .inspect_err(|e| error!("Delete remote branch {} failed: {}", branch, e))
    }

    /// Fetch a pull request's head into `refs/remotes/origin/pull/<n>`, or
    /// `refs/remotes/origin/merge-requests/<n>` on hosts that use that
    /// convention.
    pub fn fetch_pull_request(&self, number: u64) -> Result<()> {
        info!("Fetching {}/{}#{}.", self.owner, self.repo, number);
        let remote = self.upstream_url()?;
        climb(
            &[PullRef::PullRequest, PullRef::MergeRequest],
            |step| {
                let refspec = match step {
                    PullRef::PullRequest => {
                        format!("+refs/pull/{0}/head:refs/remotes/origin/pull/{0}", number)
                    }
                    PullRef::MergeRequest => format!(
                        "+refs/merge-requests/{0}/head:refs/remotes/origin/merge-requests/{0}",
                        number
                    ),
                };
                self.fetch_refspec_robust(&remote, &refspec)
            },
            |_, _| true,
        )
    }

    /// Fetch one refspec, narrowing to depth 1 on transport trouble and
    /// finally dropping the partial-clone filter altogether.
    pub(crate) fn fetch_refspec_robust(&self, remote: &str, refspec: &str) -> Result<()> {
        climb(
            &[FetchStep::Filtered, FetchStep::Shallow, FetchStep::Full],
            |step| match step {
                FetchStep::Filtered => self
                    .git_remote(&["fetch", "--no-tags", "--filter=blob:none", remote, refspec])
                    .map(drop),
                FetchStep::Shallow => self
                    .git_remote(&["fetch", "--no-tags", "--depth", "1", remote, refspec])
                    .map(drop),
                FetchStep::Full => {
                    if let Err(e) = self.disable_partial_clone() {
                        debug!("disable partial clone: {}", e);
                    }
                    self.git_remote(&["fetch", "--no-tags", remote, refspec])
                        .map(drop)
                }
            },
            |step, e| matches!(step, FetchStep::Shallow) || e.kind() == FailureKind::Transient,
        )
        .inspect_err(|e| {
            error!(
                "fetch {} from {} failed: {}",
                refspec,
                de_secret(remote),
                e
            )
        })
    }

    /// Create `branch` from `upstream_ref` (e.g. `upstream/release`) and
    /// push it to origin.
    pub fn create_branch_and_push_to_origin(&self, branch: &str, upstream_ref: &str) -> Result<()> {
        info!("Create new branch {} from {}", branch, upstream_ref);
        if let Err(e) = self.git(&["checkout", "-B", branch, upstream_ref]) {
            warn!("initial checkout -B failed: {}", e);
            if e.kind() == FailureKind::DirtyState {
                if let Ok(sha) = self.rev_parse(upstream_ref) {
                    warn!(
                        "checkout blocked by the working tree, pushing {} to origin/{} directly",
                        sha, branch
                    );
                    let refspec = format!("{}:refs/heads/{}", sha, branch);
                    return self
                        .git_remote(&["push", "-u", "origin", &refspec])
                        .map(drop);
                }
            }

            let source = upstream_ref.split('/').next().unwrap_or("upstream");
            if !self.remote_branch_exists_in(source, branch) {
                error!("{} branch {} not found", source, branch);
                return Err(Error::BranchNotFound {
                    remote: source.to_string(),
                    branch: branch.to_string(),
                });
            }
            self.fetch_refspec_robust(source, &tracking_refspec(source, branch))?;

            let origin_ref = format!("origin/{}", branch);
            climb(
                &[
                    BranchSource::Commit,
                    BranchSource::SymbolicRef,
                    BranchSource::Origin,
                ],
                |step| match step {
                    BranchSource::Commit => {
                        let sha = self.rev_parse(upstream_ref)?;
                        self.git(&["checkout", "-B", branch, &sha]).map(drop)
                    }
                    BranchSource::SymbolicRef => self
                        .git(&["checkout", "-B", branch, upstream_ref])
                        .map(drop),
                    BranchSource::Origin => {
                        if !self.remote_branch_exists_in("origin", branch) {
                            return Err(Error::BranchNotFound {
                                remote: "origin".to_string(),
                                branch: branch.to_string(),
                            });
                        }
                        self.git(&["checkout", "-B", branch, &origin_ref]).map(drop)
                    }
                },
                |_, _| true,
            )?;
        }

        self.git_remote(&["push", "-u", "origin", branch])
            .map(drop)
            .inspect_err(|e| error!("push new branch {} to origin failed: {}", branch, e))
    }

    /// Merge `reference` using the given fast-forward policy.
    pub fn merge(&self, reference: &str, option: MergeOption) -> Result<()> {
        self.ensure_identity()?;
        info!("Running git merge {} {}", option.as_flag(), reference);
        self.git(&["merge", option.as_flag(), reference]).map(drop)
    }

    pub fn has_remote(&self, name: &str) -> Result<bool> {
        let remotes = self.git(&["remote"])?;
        Ok(remotes.lines().any(|line| line.trim() == name))
    }

    pub fn add_remote(&self, name: &str, url: &str) -> Result<()> {
        info!("Add remote {} {}", name, de_secret(url));
        self.git(&["remote", "add", name, url]).map(drop)
    }

    pub fn remove_remote(&self, name: &str) -> Result<()> {
        self.git(&["remote", "remove", name]).map(drop)
    }

    /// Fetch `branch` from the upstream remote into `upstream/<branch>`.
    pub fn fetch_upstream(&self, branch: &str) -> Result<()> {
        info!("fetch upstream branch {}", branch);
        self.fetch_refspec_robust("upstream", &tracking_refspec("upstream", branch))
    }

    pub fn merge_upstream(&self, branch: &str) -> Result<()> {
        info!("merge upstream branch {}", branch);
        self.merge(&format!("upstream/{}", branch), MergeOption::FastForward)
    }

    /// Publish the fetched `upstream/<branch>` as `<branch>` on origin.
    pub fn push_upstream_to_origin(&self, branch: &str) -> Result<()> {
        let refspec = format!("refs/remotes/upstream/{0}:refs/heads/{0}", branch);
        self.git_remote(&["push", "origin", &refspec])
            .map(drop)
            .inspect_err(|e| error!("push upstream {} to origin failed: {}", branch, e))
    }

    pub fn deepen(&self, commits: u32) -> Result<()> {
        let commits = commits.to_string();
        self.git_remote(&["fetch", "--deepen", &commits]).map(drop)
    }

    pub fn fetch_branch_depth(&self, branch: &str, depth: u32) -> Result<()> {
        let depth = depth.to_string();
        self.git_remote(&[
            "fetch",
            "--no-tags",
            "--filter=blob:none",
            "--depth",
            &depth,
            "origin",
            branch,
        ])
        .map(drop)
    }

    /// Restrict the working tree to `paths` with a cone-mode sparse checkout.
    pub fn sparse<S: AsRef<str>>(&self, paths: &[S]) -> Result<()> {
        self.git(&["sparse-checkout", "init", "--cone"])?;
        let mut args = vec!["sparse-checkout", "set"];
        args.extend(paths.iter().map(|p| p.as_ref()));
        self.git(&args).map(drop)
    }

    /// Sparse checkout of the directories touched by `first^..last`. Files at
    /// the top level are always present in cone mode. An empty diff leaves
    /// the checkout as it is.
    pub fn sparse_for_range(&self, first: &str, last: &str) -> Result<()> {
        let range = format!("{}^..{}", first, last);
        let changed = self.git(&["diff", "--name-only", &range])?;
        let files: Vec<&str> = changed
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .collect();
        if files.is_empty() {
            return Ok(());
        }
        let dirs: BTreeSet<&str> = files
            .iter()
            .filter_map(|file| file.rsplit_once('/').map(|(dir, _)| dir))
            .collect();
        let dirs: Vec<&str> = dirs.into_iter().collect();
        self.sparse(&dirs)
    }

    pub fn config(&self, key: &str, value: &str) -> Result<()> {
        info!("Running git config {} {}", key, value);
        self.git(&["config", key, value]).map(drop)
    }

    /// Write the bot's committer identity unless one is already configured.
    pub fn ensure_identity(&self) -> Result<()> {
        let wanted = [
            ("user.name", self.identity.name.as_str()),
            ("user.email", self.identity.email.as_str()),
        ];
        for (key, value) in wanted {
            let current = self
                .git(&["config", "--get", key])
                .map(|out| out.trim().to_string())
                .unwrap_or_default();
            if current.is_empty() {
                self.config(key, value)?;
            }
        }
        Ok(())
    }

    /// Turn off partial-clone and promisor settings for origin.
    pub fn disable_partial_clone(&self) -> Result<()> {
        self.disable_partial_clone_for("origin")
    }

    /// Turn off partial-clone and promisor settings for `remote`. Safe to
    /// call repeatedly.
    pub fn disable_partial_clone_for(&self, remote: &str) -> Result<()> {
        let promisor = format!("remote.{}.promisor", remote);
        let filter = format!("remote.{}.partialclonefilter", remote);
        self.git(&["config", "--local", &promisor, "false"])?;
        // Absent keys make --unset-all fail, which is the desired end state.
        let _ = self.git(&["config", "--local", "--unset-all", &promisor]);
        let _ = self.git(&["config", "--local", "--unset-all", &filter]);
        let _ = self.git(&["config", "--local", "--unset-all", "extensions.partialclone"]);
        Ok(())
    }
}
