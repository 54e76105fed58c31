//! # Clone and Fetch Orchestration
//!
//! [`Client`] is the long-lived service object of the crate. It owns the
//! credentials, the per-repository lock registry, the git runner and the set
//! of large repositories, and turns an `owner/repo` pair into a ready
//! [`WorkingCopy`] under `<cache_root>/<owner>/<repo>`.
//!
//! A repository whose `.git` directory already exists is refreshed with a
//! fetch. Otherwise it is cloned, degrading from a single-branch clone to a
//! depth-1 clone to a manual init-and-fetch when the transport gives out.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};

use log::{error, info, warn};
use rayon::prelude::*;

use crate::classify::FailureKind;
use crate::config::{Config, Identity, LargeRepo, LargeRepos};
use crate::credentials::{CredentialStore, Credentials};
use crate::error::{Error, Result};
use crate::ladder::climb;
use crate::locks::{acquire, RepoLocks};
use crate::repo::{remote_url, WorkingCopy};
use crate::runner::{run_git, run_git_with_retry, CommandRunner, GitRunner, RetryPolicy};
use crate::secret::de_secret;

/// Name of the temporary remote used while prewarming from a mirror.
const MIRROR_REMOTE: &str = "mirror";

#[derive(Debug)]
enum CloneStep {
    Primary,
    Shallow,
    Bootstrap,
}

/// Clones repositories into a local cache, one at a time per repository.
pub struct Client {
    credentials: CredentialStore,
    locks: RepoLocks,
    runner: Arc<dyn CommandRunner>,
    base_url: String,
    cache_root: PathBuf,
    retry: RetryPolicy,
    identity: Identity,
    large_repos: LargeRepos,
}

impl Client {
    /// Build a client that runs the system git.
    pub fn new(config: &Config) -> Result<Self> {
        let runner = GitRunner::locate(config.git.as_deref())?;
        info!("Using git at {}", runner.path().display());
        Self::with_runner(config, Arc::new(runner))
    }

    /// Build a client around any command runner.
    pub fn with_runner(config: &Config, runner: Arc<dyn CommandRunner>) -> Result<Self> {
        let client = Self {
            credentials: CredentialStore::new(),
            locks: RepoLocks::new(),
            runner,
            base_url: config.base_url(),
            cache_root: config.cache_root(),
            retry: config.retry.policy(),
            identity: config.identity.clone(),
            large_repos: config.large_repo_set(),
        };
        if let Some((user, token)) = config.credentials.load()? {
            client.set_credentials(&user, &token)?;
        }
        Ok(client)
    }

    /// Set the identity used for pushing and pulling.
    pub fn set_credentials(&self, user: &str, token: &[u8]) -> Result<()> {
        self.credentials.set(user, token)
    }

    pub fn credentials(&self) -> Result<Credentials> {
        self.credentials.get()
    }

    pub fn large_repos(&self) -> &LargeRepos {
        &self.large_repos
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        self.retry
    }

    pub fn cache_root(&self) -> &Path {
        &self.cache_root
    }

    /// Where `owner/repo` lives on disk.
    pub fn repo_dir(&self, owner: &str, repo: &str) -> PathBuf {
        self.cache_root.join(owner).join(repo)
    }

    /// Return a working copy of `owner/repo`, cloning it on first use and
    /// fetching it afterwards.
    ///
    /// Calls for the same repository are serialized; different repositories
    /// proceed in parallel.
    pub fn clone_repo(&self, owner: &str, repo: &str) -> Result<WorkingCopy> {
        let full_name = format!("{}/{}", owner, repo);
        let lock = self.locks.lock_for(&full_name);
        let _guard = acquire(&lock);

        let credentials = self.credentials.get()?;
        let large = self.large_repos.get(owner, repo);
        let remote_owner = large.map_or(owner, LargeRepo::remote_owner);
        let remote = remote_url(&self.base_url, remote_owner, repo, &credentials)?;
        let dir = self.repo_dir(owner, repo);

        if dir.join(".git").is_dir() {
            if large.is_some_and(|l| l.skip_refresh) {
                info!("Reusing {} without refresh.", full_name);
            } else {
                info!("Fetching {}.", full_name);
                self.git_remote(Some(&dir), &["fetch"])?;
            }
        } else {
            info!("Cloning {}.", full_name);
            if let Some(parent) = dir.parent() {
                fs::create_dir_all(parent)?;
            }
            self.initial_clone(&dir, &remote, large)?;
        }

        Ok(WorkingCopy {
            dir,
            owner: owner.to_string(),
            repo: repo.to_string(),
            remote_owner: remote_owner.to_string(),
            base_url: self.base_url.clone(),
            credentials,
            identity: self.identity.clone(),
            retry: self.retry,
            runner: Arc::clone(&self.runner),
        })
    }

    fn git<S: AsRef<str>>(&self, dir: Option<&Path>, args: &[S]) -> Result<String> {
        run_git(self.runner.as_ref(), dir, args)
    }

    fn git_remote<S: AsRef<str>>(&self, dir: Option<&Path>, args: &[S]) -> Result<String> {
        run_git_with_retry(self.runner.as_ref(), &self.retry, dir, args)
    }

    fn initial_clone(&self, dir: &Path, remote: &str, large: Option<&LargeRepo>) -> Result<()> {
        let target = dir.to_string_lossy().into_owned();
        let primary_depth = large.map(|l| l.depth.to_string());

        let result = climb(
            &[CloneStep::Primary, CloneStep::Shallow, CloneStep::Bootstrap],
            |step| match step {
                CloneStep::Primary => {
                    let mut args = vec!["clone", "--no-tags", "--single-branch"];
                    if let Some(depth) = &primary_depth {
                        args.extend(["--depth", depth.as_str()]);
                    }
                    args.extend([remote, target.as_str()]);
                    self.git_remote(None, &args).map(drop)
                }
                CloneStep::Shallow => {
                    let args = [
                        "clone",
                        "--no-tags",
                        "--single-branch",
                        "--depth",
                        "1",
                        remote,
                        target.as_str(),
                    ];
                    self.git_remote(None, &args).map(drop)
                }
                CloneStep::Bootstrap => {
                    fs::create_dir_all(dir)?;
                    self.git(Some(dir), &["init"])?;
                    self.ensure_origin(dir, remote)?;
                    self.git_remote(Some(dir), &["fetch", "--no-tags", "--depth", "1", "origin"])
                        .map(drop)
                }
            },
            |step, e| matches!(step, CloneStep::Shallow) || e.kind() == FailureKind::Transient,
        );

        match result {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == FailureKind::DirtyState => {
                self.recover_destination(dir, remote, large.is_some(), e)
            }
            Err(e) => {
                error!(
                    "Clone of {} into {} failed: {}",
                    de_secret(remote),
                    dir.display(),
                    e
                );
                // A half-bootstrapped repository would pass for a cached one.
                if dir.exists() {
                    if let Err(rm) = fs::remove_dir_all(dir) {
                        warn!("removing {} after failed clone: {}", dir.display(), rm);
                    }
                }
                Err(e)
            }
        }
    }

    /// The clone target already exists. A usable repository there is
    /// refreshed in place; anything else is replaced, except for large
    /// repositories, which are too expensive to reclone blindly.
    fn recover_destination(&self, dir: &Path, remote: &str, large: bool, cause: Error) -> Result<()> {
        if dir.join(".git").is_dir() {
            info!("Path exists for {}, switching to fetch.", dir.display());
            self.git_remote(Some(dir), &["fetch"])?;
            let head = self
                .git(Some(dir), &["symbolic-ref", "--short", "refs/remotes/origin/HEAD"])
                .map(|out| out.trim().trim_start_matches("origin/").to_string())
                .unwrap_or_default();
            if !head.is_empty() {
                let tracking = format!("origin/{}", head);
                if let Err(e) = self.git(Some(dir), &["checkout", "-B", &head, &tracking]) {
                    warn!("checkout of default branch {} failed: {}", head, e);
                }
            }
            return Ok(());
        }

        if large {
            error!("Clone destination {} exists without a repository", dir.display());
            return Err(Error::DestinationExists {
                dir: dir.display().to_string(),
                output: cause.output().unwrap_or_default().to_string(),
            });
        }

        warn!("Removing {} and cloning again.", dir.display());
        fs::remove_dir_all(dir)?;
        let target = dir.to_string_lossy().into_owned();
        self.git_remote(
            None,
            &["clone", "--no-tags", "--single-branch", remote, target.as_str()],
        )
        .map(drop)
        .inspect_err(|e| error!("Reclone of {} failed: {}", de_secret(remote), e))
    }

    /// Point the `origin` remote of `dir` at `remote`, adding it if missing.
    fn ensure_origin(&self, dir: &Path, remote: &str) -> Result<()> {
        if self.git(Some(dir), &["remote", "add", "origin", remote]).is_err() {
            self.git(Some(dir), &["remote", "set-url", "origin", remote])?;
        }
        Ok(())
    }

    /// Populate the cache for every large repository ahead of the first
    /// request, in parallel. Each repository is attempted; the first error
    /// is returned.
    pub fn prewarm_large_repos(&self) -> Result<()> {
        let repos: Vec<&LargeRepo> = self.large_repos.iter().collect();
        info!("Prewarming {} large repositories", repos.len());

        let errors: Mutex<Vec<Error>> = Mutex::new(Vec::new());
        repos.par_iter().for_each(|large| {
            if let Err(e) = self.prewarm(large) {
                error!("Prewarm of {} failed: {}", large.name, e);
                errors
                    .lock()
                    .unwrap_or_else(PoisonError::into_inner)
                    .push(e);
            }
        });

        let errors = errors.into_inner().unwrap_or_else(PoisonError::into_inner);
        match errors.into_iter().next() {
            Some(first) => Err(first),
            None => Ok(()),
        }
    }

    fn prewarm(&self, large: &LargeRepo) -> Result<()> {
        let lock = self.locks.lock_for(&large.name);
        let _guard = acquire(&lock);

        let credentials = self.credentials.get()?;
        let remote = remote_url(&self.base_url, large.remote_owner(), large.repo(), &credentials)?;
        let dir = self.repo_dir(large.owner(), large.repo());
        let depth = large.depth.to_string();

        fs::create_dir_all(&dir)?;
        if !dir.join(".git").is_dir() {
            self.git(Some(&dir), &["init"])?;
        }
        self.ensure_origin(&dir, &remote)?;

        let primary = self.git_remote(
            Some(&dir),
            &["fetch", "--no-tags", "--depth", &depth, "origin"],
        );
        let cause = match primary {
            Ok(_) => return Ok(()),
            Err(e) => e,
        };
        let Some(mirror) = &large.mirror else {
            return Err(cause);
        };

        warn!(
            "Fetching {} failed, populating from mirror {}: {}",
            large.name,
            de_secret(mirror),
            cause
        );
        // A mirror left over from an interrupted prewarm is replaced.
        if self.git(Some(&dir), &["remote", "add", MIRROR_REMOTE, mirror]).is_err() {
            self.git(Some(&dir), &["remote", "set-url", MIRROR_REMOTE, mirror])?;
        }
        let fetched = self.git_remote(
            Some(&dir),
            &[
                "fetch",
                "--no-tags",
                "--depth",
                &depth,
                MIRROR_REMOTE,
                "+refs/heads/*:refs/remotes/origin/*",
            ],
        );
        let removed = self.git(Some(&dir), &["remote", "remove", MIRROR_REMOTE]);
        fetched?;
        removed.map(drop)
    }
}
