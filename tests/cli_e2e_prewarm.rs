//! End-to-end tests for the `prewarm` command.

mod common;

use common::prelude::*;

#[test]
fn test_prewarm_without_large_repos() {
    let mut cmd = cargo_bin_cmd!("sync-bot");
    cmd.arg("prewarm")
        .assert()
        .success()
        .stdout(predicate::str::contains("No large repositories configured."));
}

#[test]
fn test_prewarm_populates_cache() {
    if !git_available() {
        return;
    }
    let remote = RemoteFixture::new();
    let config = remote.write_config();
    let mut contents = std::fs::read_to_string(&config).unwrap();
    contents.push_str("large_repos:\n  - name: o/r\n    depth: 1\n");
    std::fs::write(&config, contents).unwrap();

    let mut cmd = cargo_bin_cmd!("sync-bot");
    cmd.arg("--config")
        .arg(&config)
        .arg("prewarm")
        .assert()
        .success();

    let dir = remote.cache_root().join("o").join("r");
    assert!(dir.join(".git").is_dir());
    let fetched = git(&dir, &["rev-parse", "refs/remotes/origin/master"]);
    assert_eq!(fetched, remote.feature);
}
