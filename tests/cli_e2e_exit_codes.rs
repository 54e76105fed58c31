//! End-to-end tests for CLI exit codes.
//!
//! - Exit code 0: Success
//! - Exit code 1: General error, including a branch that could not be synced
//! - Exit code 2: Invalid command-line usage (handled by clap)

use assert_cmd::cargo::cargo_bin_cmd;
use assert_fs::prelude::*;
use predicates::prelude::*;

/// Exit code 0 is returned for --help.
#[test]
fn test_exit_code_help() {
    let mut cmd = cargo_bin_cmd!("sync-bot");

    cmd.arg("--help")
        .assert()
        .code(0)
        .stdout(predicate::str::contains("pick"))
        .stdout(predicate::str::contains("prewarm"));
}

/// Exit code 0 is returned for --version.
#[test]
fn test_exit_code_version() {
    let mut cmd = cargo_bin_cmd!("sync-bot");

    cmd.arg("--version")
        .assert()
        .code(0)
        .stdout(predicate::str::contains(env!("CARGO_PKG_VERSION")));
}

/// Exit code 1 is returned for configuration file not found.
#[test]
fn test_exit_code_error_config_not_found() {
    let temp = assert_fs::TempDir::new().unwrap();
    let mut cmd = cargo_bin_cmd!("sync-bot");

    cmd.current_dir(temp.path())
        .arg("--config")
        .arg("nonexistent.yaml")
        .arg("prewarm")
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Failed to load config"));
}

/// Exit code 1 is returned for an unknown configuration key.
#[test]
fn test_exit_code_error_unknown_config_key() {
    let temp = assert_fs::TempDir::new().unwrap();
    let config_file = temp.child("sync-bot.yaml");
    config_file.write_str("hots: gitcode.com\n").unwrap();

    let mut cmd = cargo_bin_cmd!("sync-bot");

    cmd.arg("--config")
        .arg(config_file.path())
        .arg("prewarm")
        .assert()
        .code(1)
        .stderr(predicate::str::contains("hots"));
}

/// Exit code 1 is returned for a malformed large repository entry.
#[test]
fn test_exit_code_error_invalid_large_repo() {
    let temp = assert_fs::TempDir::new().unwrap();
    let config_file = temp.child("sync-bot.yaml");
    config_file
        .write_str("large_repos:\n  - name: kernel\n")
        .unwrap();

    let mut cmd = cargo_bin_cmd!("sync-bot");

    cmd.arg("--config")
        .arg(config_file.path())
        .arg("prewarm")
        .assert()
        .code(1)
        .stderr(predicate::str::contains("owner/repo"));
}

/// Exit code 2 is returned for unknown command-line flags (handled by clap).
#[test]
fn test_exit_code_usage_unknown_flag() {
    let mut cmd = cargo_bin_cmd!("sync-bot");

    cmd.arg("--unknown-flag-that-does-not-exist")
        .assert()
        .code(2)
        .stderr(predicate::str::contains("error:"));
}

/// Exit code 2 is returned when required arguments are missing.
#[test]
fn test_exit_code_usage_missing_required_arg() {
    let mut cmd = cargo_bin_cmd!("sync-bot");

    cmd.args(["pick", "o/r", "--pr", "1"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("required"));
}

/// Exit code 2 is returned for an unknown cherry-pick strategy.
#[test]
fn test_exit_code_usage_invalid_strategy() {
    let mut cmd = cargo_bin_cmd!("sync-bot");

    cmd.args([
        "pick", "o/r", "--pr", "1", "--source", "fix", "--first", "a", "--last", "b",
        "--onto", "x", "--strategy", "recursive",
    ])
    .assert()
    .code(2)
    .stderr(predicate::str::contains("ours or theirs"));
}
