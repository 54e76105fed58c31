//! # Error Handling
//!
//! This module defines the single error type of the crate. It uses
//! `thiserror` to give every failure mode a descriptive message, and ties
//! each variant back to a [`FailureKind`] so that callers can decide how to
//! react (retry, clean up, report a missing branch, give up) without parsing
//! strings.
//!
//! ## Key Components
//!
//! - **`Error`**: every failure the git layer, configuration loading and the
//!   sync orchestration can produce.
//! - **`Result<T>`**: `std::result::Result<T, Error>`.
//!
//! Any text that may contain a remote URL (command lines, git output) is
//! redacted before it is stored in an `Error`, so errors are safe to log or
//! post back as a comment.

use thiserror::Error;

use crate::classify::FailureKind;

/// Main error type for sync-bot operations
#[derive(Error, Debug)]
pub enum Error {
    /// A git command exited unsuccessfully.
    ///
    /// `command` and `output` are already redacted.
    #[error("git {command} failed in {dir} ({kind}): {output}")]
    Command {
        command: String,
        dir: String,
        output: String,
        kind: FailureKind,
    },

    /// The git executable could not be found or started.
    #[error("git executable not found: {name}")]
    GitNotFound { name: String },

    /// A push-like operation was attempted without a user and token.
    #[error("cannot {operation} without credentials - configure your git client")]
    MissingCredentials { operation: String },

    /// A branch does not exist on any of the remotes that were consulted.
    #[error("branch {branch} not found on {remote}")]
    BranchNotFound { remote: String, branch: String },

    /// The clone destination exists but holds no usable repository.
    #[error("git clone failed (destination exists) for {dir}: {output}")]
    DestinationExists { dir: String, output: String },

    /// Cherry-picking stopped on conflicts that no strategy could resolve.
    #[error("synchronization failed for {range}: {output}")]
    SyncFailed { range: String, output: String },

    /// A repository identifier was not of the form `owner/repo`.
    #[error("invalid repository identifier: {name}")]
    InvalidRepository { name: String },

    /// A chat command could not be parsed.
    #[error("invalid command: {message}")]
    InvalidCommand { message: String },

    /// The configuration file is malformed or inconsistent.
    #[error("Configuration parsing error: {message}{}", hint.as_ref().map(|h| format!("\n  hint: {}", h)).unwrap_or_default())]
    ConfigParse {
        message: String,
        /// Optional hint for how to fix the configuration issue
        hint: Option<String>,
    },

    /// The hosting platform rejected or failed a request.
    #[error("platform request failed: {message}")]
    Platform { message: String },

    /// An error indicating that a mutex or other lock has been poisoned.
    #[error("Lock poisoned: {context}")]
    LockPoisoned { context: String },

    /// An I/O error, wrapped from `std::io::Error`.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A YAML parsing error, wrapped from `serde_yaml::Error`.
    #[error("YAML parsing error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// A URL parsing error, wrapped from `url::ParseError`.
    #[error("URL parsing error: {0}")]
    UrlParse(#[from] url::ParseError),
}

impl Error {
    /// The recovery category of this error.
    pub fn kind(&self) -> FailureKind {
        match self {
            Error::Command { kind, .. } => *kind,
            Error::GitNotFound { .. } | Error::MissingCredentials { .. } => {
                FailureKind::Configuration
            }
            Error::ConfigParse { .. } => FailureKind::Configuration,
            Error::BranchNotFound { .. } | Error::InvalidRepository { .. } => {
                FailureKind::NotFound
            }
            Error::DestinationExists { .. } => FailureKind::DirtyState,
            Error::SyncFailed { .. } => FailureKind::Conflict,
            _ => FailureKind::Unknown,
        }
    }

    /// The combined git output carried by this error, if any.
    pub fn output(&self) -> Option<&str> {
        match self {
            Error::Command { output, .. }
            | Error::DestinationExists { output, .. }
            | Error::SyncFailed { output, .. } => Some(output),
            _ => None,
        }
    }
}

/// A convenient type alias for `Result<T, Error>`.
pub type Result<T> = std::result::Result<T, Error>;
