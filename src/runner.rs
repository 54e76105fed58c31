//! # Running Git
//!
//! Every git invocation in the crate goes through a [`CommandRunner`]. The
//! production implementation, [`GitRunner`], shells out to the system `git`
//! binary, which automatically honours the host's git configuration. Tests
//! swap in a scripted runner instead, the same way the repository layer can
//! be driven without touching the network.
//!
//! Two calling conventions sit on top of the runner:
//!
//! - [`run_git`] runs a purely local command exactly once. A local failure
//!   (dirty tree, missing ref) does not fix itself by waiting.
//! - [`run_git_with_retry`] is for anything that talks to the remote
//!   (clone, fetch, push). It prefixes low-speed-abort options and retries
//!   with exponential backoff according to a [`RetryPolicy`].

use std::env;
use std::ffi::{OsStr, OsString};
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::thread;
use std::time::Duration;

use log::debug;

use crate::classify::classify;
use crate::error::{Error, Result};
use crate::secret::{de_secret, de_secret_args};

/// Options passed ahead of every network-facing command. A transfer slower
/// than 1000 bytes/s for 60 seconds is aborted, standing in for a timeout.
pub const NETWORK_OPTIONS: [&str; 6] = [
    "-c",
    "http.lowSpeedLimit=1000",
    "-c",
    "http.lowSpeedTime=60",
    "-c",
    "protocol.version=2",
];

/// Exit status and combined stdout/stderr of one command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandOutput {
    pub success: bool,
    pub output: String,
}

/// Executes the git binary.
pub trait CommandRunner: Send + Sync {
    /// Run git with `args`, inside `dir` when given.
    ///
    /// Returns `Err` only when the process could not be started at all; a
    /// command that ran and failed is reported through
    /// [`CommandOutput::success`].
    fn run(&self, dir: Option<&Path>, args: &[String]) -> Result<CommandOutput>;
}

/// Runs the system `git` executable.
#[derive(Debug, Clone)]
pub struct GitRunner {
    git: PathBuf,
}

impl GitRunner {
    pub fn new(git: impl Into<PathBuf>) -> Self {
        Self { git: git.into() }
    }

    /// Resolve the git executable: the explicit path if one is configured,
    /// otherwise the first executable `git` on `PATH`.
    pub fn locate(explicit: Option<&Path>) -> Result<Self> {
        Self::locate_in(explicit, env::var_os("PATH"))
    }

    pub(crate) fn locate_in(explicit: Option<&Path>, paths: Option<OsString>) -> Result<Self> {
        let name = explicit.map_or_else(|| OsStr::new("git"), Path::as_os_str);
        let cwd = env::current_dir()?;
        which::which_in(name, paths, cwd)
            .map(Self::new)
            .map_err(|e| {
                debug!("locating {}: {}", name.to_string_lossy(), e);
                Error::GitNotFound {
                    name: name.to_string_lossy().into_owned(),
                }
            })
    }

    pub fn path(&self) -> &Path {
        &self.git
    }
}

impl CommandRunner for GitRunner {
    fn run(&self, dir: Option<&Path>, args: &[String]) -> Result<CommandOutput> {
        let mut cmd = Command::new(&self.git);
        cmd.args(args)
            .env("GIT_TERMINAL_PROMPT", "0")
            .stdin(Stdio::null());
        if let Some(dir) = dir {
            cmd.current_dir(dir);
        }

        let output = cmd.output().map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                Error::GitNotFound {
                    name: self.git.display().to_string(),
                }
            } else {
                Error::Io(e)
            }
        })?;

        let mut combined = String::from_utf8_lossy(&output.stdout).into_owned();
        combined.push_str(&String::from_utf8_lossy(&output.stderr));
        Ok(CommandOutput {
            success: output.status.success(),
            output: combined,
        })
    }
}

/// Bounded exponential backoff.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total number of attempts, including the first one.
    pub attempts: u32,
    /// Delay after the first failed attempt; doubled after each further one.
    pub initial_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            attempts: 5,
            initial_delay: Duration::from_secs(1),
        }
    }
}

impl RetryPolicy {
    pub fn new(attempts: u32, initial_delay: Duration) -> Self {
        Self {
            attempts,
            initial_delay,
        }
    }

    /// A policy that never retries.
    pub fn once() -> Self {
        Self::new(1, Duration::ZERO)
    }

    /// Delay to wait after failed attempt number `attempt` (1-based).
    pub fn delay_for(&self, attempt: u32) -> Duration {
        if self.initial_delay.is_zero() {
            return Duration::ZERO;
        }
        2u32.checked_pow(attempt.saturating_sub(1))
            .and_then(|factor| self.initial_delay.checked_mul(factor))
            .unwrap_or(Duration::MAX)
    }

    /// Run `op` until it succeeds, `should_retry` rejects its error, or the
    /// attempts are used up. `op` receives the 1-based attempt number.
    pub fn retry<T, F, P>(&self, mut op: F, should_retry: P) -> Result<T>
    where
        F: FnMut(u32) -> Result<T>,
        P: Fn(&Error) -> bool,
    {
        let attempts = self.attempts.max(1);
        let mut attempt = 1;
        loop {
            match op(attempt) {
                Ok(value) => return Ok(value),
                Err(e) if attempt < attempts && should_retry(&e) => {
                    let delay = self.delay_for(attempt);
                    debug!(
                        "Retrying #{} of {} in {:?}: {}",
                        attempt, attempts, delay, e
                    );
                    thread::sleep(delay);
                    attempt += 1;
                }
                Err(e) => return Err(e),
            }
        }
    }
}

/// Run a local git command once and return its combined output.
pub fn run_git<S: AsRef<str>>(
    runner: &dyn CommandRunner,
    dir: Option<&Path>,
    args: &[S],
) -> Result<String> {
    let args: Vec<String> = args.iter().map(|a| a.as_ref().to_string()).collect();
    debug!(
        "Constructed git command: {:?} in {}",
        de_secret_args(&args),
        display_dir(dir)
    );
    execute(runner, dir, &args)
}

/// Run a network-facing git command with low-speed-abort options, retrying
/// with backoff while the failure looks retryable.
pub fn run_git_with_retry<S: AsRef<str>>(
    runner: &dyn CommandRunner,
    policy: &RetryPolicy,
    dir: Option<&Path>,
    args: &[S],
) -> Result<String> {
    let args: Vec<String> = NETWORK_OPTIONS
        .iter()
        .map(|a| a.to_string())
        .chain(args.iter().map(|a| a.as_ref().to_string()))
        .collect();
    debug!(
        "Constructed git command: {:?} in {}",
        de_secret_args(&args[NETWORK_OPTIONS.len()..]),
        display_dir(dir)
    );
    policy.retry(
        |_| execute(runner, dir, &args),
        |e| e.kind().is_retryable(),
    )
}

fn execute(runner: &dyn CommandRunner, dir: Option<&Path>, args: &[String]) -> Result<String> {
    let result = runner.run(dir, args)?;
    if result.success {
        Ok(result.output)
    } else {
        Err(command_error(dir, args, &result.output))
    }
}

fn command_error(dir: Option<&Path>, args: &[String], output: &str) -> Error {
    Error::Command {
        command: de_secret_args(strip_network_options(args)).join(" "),
        dir: display_dir(dir),
        output: de_secret(output.trim()).into_owned(),
        kind: classify(output),
    }
}

/// `args` without the leading [`NETWORK_OPTIONS`], if present.
pub(crate) fn strip_network_options(args: &[String]) -> &[String] {
    let prefixed = args.len() >= NETWORK_OPTIONS.len()
        && args
            .iter()
            .zip(NETWORK_OPTIONS.iter())
            .all(|(a, b)| a == b);
    if prefixed {
        &args[NETWORK_OPTIONS.len()..]
    } else {
        args
    }
}

fn display_dir(dir: Option<&Path>) -> String {
    dir.map(|d| d.display().to_string())
        .unwrap_or_else(|| ".".to_string())
}
