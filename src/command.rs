//! Recognisers for the bot's comment commands and branch names.

use std::sync::LazyLock;

use regex::Regex;

use crate::error::{Error, Result};

static TITLE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\[sync-bot\]|\[sync\])").expect("title pattern is valid"));

static SYNC_CHECK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*/sync-check\s*$").expect("sync-check pattern is valid"));

static SYNC: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*/sync([ \t]+[\w./_-]+)+\s*$").expect("sync pattern is valid")
});

static CLOSE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*/close\s*$").expect("close pattern is valid"));

static SYNC_BRANCH: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^sync-pr\d+-.+-to-.+$").expect("sync branch pattern is valid"));

static SEPARATOR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[ \t]+").expect("separator pattern is valid"));

/// `/sync <branch>...`
pub fn is_sync(comment: &str) -> bool {
    SYNC.is_match(comment)
}

/// `/sync-check`
pub fn is_sync_check(comment: &str) -> bool {
    SYNC_CHECK.is_match(comment)
}

/// `/close`
pub fn is_close(comment: &str) -> bool {
    CLOSE.is_match(comment)
}

/// Whether a pull-request title marks it as opened by the bot.
pub fn is_bot_title(title: &str) -> bool {
    TITLE.is_match(title)
}

/// Whether `branch` is named like a branch the bot pushed.
pub fn is_sync_branch(branch: &str) -> bool {
    SYNC_BRANCH.is_match(branch)
}

/// Name of the branch carrying pull request `number` from `source` to
/// `target`.
pub fn sync_branch_name(number: u64, source: &str, target: &str) -> String {
    format!("sync-pr{}-{}-to-{}", number, source, target)
}

/// How commits reach the target branches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SyncStrategy {
    /// Cherry-pick the pull request's commits onto each target.
    #[default]
    Pick,
}

/// A parsed `/sync` command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncCommand {
    pub strategy: SyncStrategy,
    pub branches: Vec<String>,
}

/// Parse a `/sync` comment into its target branches.
///
/// No options are defined, so any `-flag` ahead of the first branch is an
/// error. `--` ends option parsing; everything after the first branch is a
/// branch name.
pub fn parse_sync_command(command: &str) -> Result<SyncCommand> {
    let mut words = SEPARATOR.split(command.trim()).skip(1);
    let mut branches = Vec::new();

    while let Some(word) = words.next() {
        if word.is_empty() {
            continue;
        }
        if word == "--" {
            branches.extend(words.by_ref().map(str::to_string));
            break;
        }
        if word.len() > 1 && word.starts_with('-') {
            return Err(Error::InvalidCommand {
                message: format!(
                    "flag provided but not defined: {}",
                    word.trim_start_matches('-')
                ),
            });
        }
        branches.push(word.to_string());
        branches.extend(words.by_ref().map(str::to_string));
    }

    Ok(SyncCommand {
        strategy: SyncStrategy::Pick,
        branches,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn branches(command: &str) -> Vec<String> {
        parse_sync_command(command).unwrap().branches
    }

    #[test]
    fn test_parse_no_branch() {
        let cmd = parse_sync_command("/sync").unwrap();
        assert_eq!(cmd.strategy, SyncStrategy::Pick);
        assert!(cmd.branches.is_empty());
    }

    #[test]
    fn test_parse_branches() {
        assert_eq!(branches("/sync branch1"), vec!["branch1"]);
        assert_eq!(branches("/sync branch1 branch2"), vec!["branch1", "branch2"]);
        assert_eq!(branches("/sync \t branch1\tbranch2  "), vec!["branch1", "branch2"]);
    }

    #[test]
    fn test_parse_special_characters() {
        assert_eq!(
            branches("/sync foo.bar foo_bar foo-bar foo/bar"),
            vec!["foo.bar", "foo_bar", "foo-bar", "foo/bar"]
        );
    }

    #[test]
    fn test_parse_leading_blank_lines() {
        assert_eq!(branches("\n\n/sync branch1"), vec!["branch1"]);
    }

    #[test]
    fn test_parse_superfluous_options() {
        let err =
            parse_sync_command("/sync -a --b x.spec openEuler-20.03-LTS make_build openEuler-20.09")
                .unwrap_err();
        assert!(err.to_string().contains("flag provided but not defined: a"));
    }

    #[test]
    fn test_parse_flag_after_branch_is_a_branch() {
        assert_eq!(branches("/sync branch1 -x"), vec!["branch1", "-x"]);
    }

    #[test]
    fn test_parse_double_dash() {
        assert_eq!(branches("/sync -- -odd main"), vec!["-odd", "main"]);
    }

    #[test]
    fn test_matchers() {
        assert!(is_sync("/sync openEuler-22.03-LTS"));
        assert!(is_sync("  /sync a b/c d.e  "));
        assert!(!is_sync("/sync"));
        assert!(!is_sync("please /sync a"));
        assert!(is_sync_check("/sync-check"));
        assert!(!is_sync_check("/sync-check now"));
        assert!(is_close(" /close "));
        assert!(!is_close("/closed"));
        assert!(is_bot_title("[sync-bot] fix build"));
        assert!(is_bot_title("[sync] fix build"));
        assert!(!is_bot_title("fix build [sync]"));
    }

    #[test]
    fn test_sync_branch_names() {
        let name = sync_branch_name(42, "feature", "release-1.0");
        assert_eq!(name, "sync-pr42-feature-to-release-1.0");
        assert!(is_sync_branch(&name));
        assert!(!is_sync_branch("feature"));
        assert!(!is_sync_branch("sync-prX-a-to-b"));
    }
}
