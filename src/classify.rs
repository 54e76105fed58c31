//! # Failure Classification
//!
//! Git reports almost every failure as a non-zero exit status plus free-form
//! text. This module maps that text onto a closed set of [`FailureKind`]s so
//! the fallback ladders in [`crate::client`] and [`crate::repo`] can branch on
//! an enum instead of scattering substring checks through every call site.
//!
//! The checks run in priority order. Credential problems win over anything
//! else, because a transport error printed after an authentication prompt is
//! still an authentication problem. Transport failures come next, then
//! local-state problems, conflicts, and finally missing refs.

use std::fmt;

/// The closed set of failure categories the recovery logic understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FailureKind {
    /// Network or transport-layer trouble. Worth retrying, possibly with a
    /// narrower or wider fetch.
    Transient,
    /// The working tree or destination is in the way: local changes,
    /// an existing clone target, an unrepresentable path.
    DirtyState,
    /// A merge or cherry-pick stopped on conflicting changes.
    Conflict,
    /// A branch, ref, revision or repository does not exist.
    NotFound,
    /// Missing credentials or a missing executable. Never retried.
    Configuration,
    /// Anything the classifier does not recognise.
    Unknown,
}

impl FailureKind {
    /// Whether repeating the exact same command might succeed.
    ///
    /// Unknown failures are retried too: a flaky remote does not always
    /// say so in a recognisable way.
    pub fn is_retryable(self) -> bool {
        matches!(self, FailureKind::Transient | FailureKind::Unknown)
    }
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            FailureKind::Transient => "transient",
            FailureKind::DirtyState => "dirty state",
            FailureKind::Conflict => "conflict",
            FailureKind::NotFound => "not found",
            FailureKind::Configuration => "configuration",
            FailureKind::Unknown => "unknown",
        };
        f.write_str(name)
    }
}

const CONFIGURATION_MARKERS: &[&str] = &[
    "could not read Username",
    "could not read Password",
    "Authentication failed",
    "terminal prompts disabled",
    "Permission denied",
];

const TRANSIENT_MARKERS: &[&str] = &[
    "RPC failed",
    "expected 'packfile'",
    "HTTP 504",
    "returned error: 504",
    "invalid index-pack output",
    "promisor remote",
    "could not fetch",
    "timed out",
    "early EOF",
    "remote end hung up unexpectedly",
    "Connection reset",
    "Could not resolve host",
];

const DIRTY_STATE_MARKERS: &[&str] = &[
    "would be overwritten by",
    "Your local changes",
    "untracked working tree files would be",
    "invalid path",
    "used by worktree",
    "is already checked out at",
    "is checked out at",
    "cherry-pick is already in progress",
];

const CONFLICT_MARKERS: &[&str] = &[
    "CONFLICT",
    "could not apply",
    "after resolving the conflicts",
    "Automatic merge failed",
];

const NOT_FOUND_MARKERS: &[&str] = &[
    "couldn't find remote ref",
    "Repository not found",
    "repository not found",
    "unknown revision",
    "did not match any",
    "does not appear to be a git repository",
    "not a valid object name",
    "bad revision",
];

/// Classify the combined output of a failed git command.
pub fn classify(output: &str) -> FailureKind {
    if contains_any(output, CONFIGURATION_MARKERS) {
        FailureKind::Configuration
    } else if contains_any(output, TRANSIENT_MARKERS) {
        FailureKind::Transient
    } else if contains_any(output, DIRTY_STATE_MARKERS) || is_destination_exists(output) {
        FailureKind::DirtyState
    } else if contains_any(output, CONFLICT_MARKERS) {
        FailureKind::Conflict
    } else if contains_any(output, NOT_FOUND_MARKERS) {
        FailureKind::NotFound
    } else {
        FailureKind::Unknown
    }
}

/// `git clone` refuses to write into a non-empty directory.
pub fn is_destination_exists(output: &str) -> bool {
    output.contains("destination path") && output.contains("already exists")
}

fn contains_any(output: &str, markers: &[&str]) -> bool {
    markers.iter().any(|marker| output.contains(marker))
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_classify_transport_failures() {
        let outputs = [
            "error: RPC failed; curl 18 transfer closed with outstanding read data remaining",
            "fatal: expected 'packfile'",
            "error: RPC failed; HTTP 504 curl 22 The requested URL returned error: 504",
            "fatal: invalid index-pack output",
            "fatal: could not fetch 1a2b3c from promisor remote",
            "fatal: early EOF",
        ];
        for output in outputs {
            assert_eq!(classify(output), FailureKind::Transient, "{}", output);
        }
    }

    #[test]
    fn test_classify_destination_exists() {
        let output = "fatal: destination path 'repos/o/r' already exists and is not an empty directory.";
        assert!(is_destination_exists(output));
        assert_eq!(classify(output), FailureKind::DirtyState);
    }

    #[test]
    fn test_classify_dirty_tree() {
        let output = "error: Your local changes to the following files would be overwritten by checkout:\n\ta.txt";
        assert_eq!(classify(output), FailureKind::DirtyState);
        let output = "error: invalid path 'aux.c'";
        assert_eq!(classify(output), FailureKind::DirtyState);
    }

    #[test]
    fn test_classify_conflict() {
        let output = "CONFLICT (content): Merge conflict in a.txt\nerror: could not apply 1a2b3c4... change";
        assert_eq!(classify(output), FailureKind::Conflict);
    }

    #[test]
    fn test_classify_not_found() {
        assert_eq!(
            classify("fatal: couldn't find remote ref refs/heads/nope"),
            FailureKind::NotFound
        );
        assert_eq!(
            classify("fatal: ambiguous argument 'x': unknown revision or path"),
            FailureKind::NotFound
        );
    }

    #[test]
    fn test_credential_prompt_beats_transport_noise() {
        let output = "fatal: could not read Username for 'https://gitcode.com': terminal prompts disabled\nfatal: early EOF";
        assert_eq!(classify(output), FailureKind::Configuration);
    }

    #[test]
    fn test_unknown_output() {
        assert_eq!(classify("something odd happened"), FailureKind::Unknown);
        assert_eq!(classify(""), FailureKind::Unknown);
    }

    #[test]
    fn test_retryable_kinds() {
        assert!(FailureKind::Transient.is_retryable());
        assert!(FailureKind::Unknown.is_retryable());
        assert!(!FailureKind::DirtyState.is_retryable());
        assert!(!FailureKind::Conflict.is_retryable());
        assert!(!FailureKind::NotFound.is_retryable());
        assert!(!FailureKind::Configuration.is_retryable());
    }

    proptest! {
        #[test]
        fn prop_conflict_marker_classifies_as_conflict(prefix in "[0-9 ]{0,20}", suffix in "[0-9 ]{0,20}") {
            let output = format!("{}CONFLICT (content){}", prefix, suffix);
            prop_assert_eq!(classify(&output), FailureKind::Conflict);
        }

        #[test]
        fn prop_classify_never_panics(output in ".*") {
            let _ = classify(&output);
        }
    }
}
