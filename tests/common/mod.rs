//! Shared test utilities for integration and E2E tests.
//!
//! Add `mod common;` to a test file, then use the helpers:
//!
//! ```rust,ignore
//! mod common;
//! use common::prelude::*;
//!
//! #[test]
//! fn test_example() {
//!     if !git_available() {
//!         return;
//!     }
//!     let remote = RemoteFixture::new();
//!     // ... test code
//! }
//! ```

use assert_fs::prelude::*;
use std::path::{Path, PathBuf};
use std::process::Command;

/// Re-export commonly used test dependencies for convenience.
pub mod prelude {
    #[allow(unused_imports)]
    pub use assert_cmd::cargo::cargo_bin_cmd;
    #[allow(unused_imports)]
    pub use assert_fs::prelude::*;
    #[allow(unused_imports)]
    pub use predicates::prelude::*;

    #[allow(unused_imports)]
    pub use super::{git, git_available, RemoteFixture};
}

/// Whether a usable `git` is on `PATH`. Tests that need one return early
/// when it is not.
pub fn git_available() -> bool {
    let found = Command::new("git")
        .arg("--version")
        .output()
        .map(|o| o.status.success())
        .unwrap_or(false);
    if !found {
        eprintln!("git not found on PATH, skipping");
    }
    found
}

/// Run git in `dir` with a fixed identity and return trimmed stdout.
pub fn git(dir: &Path, args: &[&str]) -> String {
    let output = Command::new("git")
        .args([
            "-c",
            "user.name=Fixture",
            "-c",
            "user.email=fixture@example.com",
            "-c",
            "init.defaultBranch=master",
        ])
        .args(args)
        .current_dir(dir)
        .env("GIT_TERMINAL_PROMPT", "0")
        .output()
        .expect("failed to run git");
    assert!(
        output.status.success(),
        "git {:?} failed: {}",
        args,
        String::from_utf8_lossy(&output.stderr)
    );
    String::from_utf8_lossy(&output.stdout).trim().to_string()
}

/// A local "hosting platform": bare repositories under
/// `<temp>/remotes/<owner>/<repo>.git`, reachable through a `file://` base URL.
///
/// `o/r` is seeded with
///
/// - `master`: `base`, then `feature` (modifies `a.txt`, adds `src/lib.txt`)
/// - `release`: at `base`
/// - `legacy`: `base`, then a commit deleting `a.txt`
/// - `refs/pull/1/head`: at `feature`
pub struct RemoteFixture {
    temp: assert_fs::TempDir,
    pub base: String,
    pub feature: String,
}

impl RemoteFixture {
    pub fn new() -> Self {
        let temp = assert_fs::TempDir::new().expect("Failed to create temp directory");
        let remotes = temp.child("remotes");
        let bare = remotes.child("o/r.git");
        bare.create_dir_all().expect("Failed to create bare dir");
        git(bare.path(), &["init", "--bare", "--quiet"]);
        git(bare.path(), &["symbolic-ref", "HEAD", "refs/heads/master"]);

        let work = temp.child("seed");
        work.create_dir_all().expect("Failed to create seed dir");
        let work = work.path();
        git(work, &["init", "--quiet"]);
        git(work, &["symbolic-ref", "HEAD", "refs/heads/master"]);

        std::fs::write(work.join("a.txt"), "one\n").expect("write a.txt");
        std::fs::create_dir_all(work.join("docs")).expect("mkdir docs");
        std::fs::write(work.join("docs/readme.md"), "# r\n").expect("write readme");
        git(work, &["add", "."]);
        git(work, &["commit", "--quiet", "-m", "base"]);
        let base = git(work, &["rev-parse", "HEAD"]);
        git(work, &["branch", "release"]);

        git(work, &["checkout", "--quiet", "-b", "legacy"]);
        git(work, &["rm", "--quiet", "a.txt"]);
        git(work, &["commit", "--quiet", "-m", "drop a.txt"]);

        git(work, &["checkout", "--quiet", "master"]);
        std::fs::write(work.join("a.txt"), "two\n").expect("write a.txt");
        std::fs::create_dir_all(work.join("src")).expect("mkdir src");
        std::fs::write(work.join("src/lib.txt"), "lib\n").expect("write lib");
        git(work, &["add", "."]);
        git(work, &["commit", "--quiet", "-m", "feature"]);
        let feature = git(work, &["rev-parse", "HEAD"]);

        let url = bare.path().to_string_lossy().to_string();
        git(
            work,
            &[
                "push",
                "--quiet",
                &url,
                "master",
                "release",
                "legacy",
                "master:refs/pull/1/head",
            ],
        );

        Self {
            temp,
            base,
            feature,
        }
    }

    pub fn base_url(&self) -> String {
        format!("file://{}", self.temp.child("remotes").path().display())
    }

    pub fn bare(&self) -> PathBuf {
        self.temp.child("remotes/o/r.git").path().to_path_buf()
    }

    pub fn cache_root(&self) -> PathBuf {
        self.temp.child("cache").path().to_path_buf()
    }

    /// Resolve `rev` in the bare repository, `None` when it does not exist.
    pub fn resolve(&self, rev: &str) -> Option<String> {
        let output = Command::new("git")
            .args(["rev-parse", "--verify", "--quiet", rev])
            .current_dir(self.bare())
            .output()
            .expect("failed to run git");
        output
            .status
            .success()
            .then(|| String::from_utf8_lossy(&output.stdout).trim().to_string())
    }

    /// Write a configuration file pointing at the fixture and return its path.
    pub fn write_config(&self) -> PathBuf {
        let token = self.temp.child("token");
        token.write_str("secret-token\n").expect("write token");
        let config = self.temp.child("sync-bot.yaml");
        config
            .write_str(&format!(
                "base_url: {}\ncache_root: {}\ncredentials:\n  user: bot\n  token_file: {}\nretry:\n  attempts: 2\n  initial_delay_ms: 0\n",
                self.base_url(),
                self.cache_root().display(),
                token.path().display()
            ))
            .expect("write config");
        config.path().to_path_buf()
    }
}

impl Default for RemoteFixture {
    fn default() -> Self {
        Self::new()
    }
}
