//! # Sync Bot Library
//!
//! This library implements the git side of a bot that answers `/sync <branch>...`
//! comments on pull requests by cherry-picking the pull request's commits onto
//! each named branch, pushing a sync branch and opening a pull request for it.
//! It is used by the `sync-bot` command-line tool and can be embedded into a
//! webhook service.
//!
//! ## Quick Example
//!
//! ```
//! use sync_bot::command::{parse_sync_command, sync_branch_name};
//!
//! let command = parse_sync_command("/sync release-1.0 release-2.0").unwrap();
//! assert_eq!(command.branches, vec!["release-1.0", "release-2.0"]);
//! assert_eq!(sync_branch_name(7, "fix", "release-1.0"), "sync-pr7-fix-to-release-1.0");
//! ```
//!
//! ## Core Concepts
//!
//! - **Runner (`runner`)**: Runs the system `git` and retries network commands
//!   with exponential backoff.
//! - **Classification (`classify`)**: Maps git output to a recovery category,
//!   which every fallback decision keys off.
//! - **Client (`client`)**: Owns credentials and per-repository locks, and
//!   clones or refreshes working copies, with extra care for large repositories.
//! - **Working copies (`repo`)**: Checkout, branch, cherry-pick, merge and push
//!   operations, each with its own ladder of fallbacks.
//! - **Sync (`sync`)**: Drives a working copy through the per-branch pipeline.
//!
//! Everything shells out to git; there is no in-process git implementation.

pub mod classify;
pub mod client;
pub mod command;
pub mod config;
pub mod credentials;
pub mod defaults;
pub mod error;
pub mod ladder;
pub mod locks;
pub mod repo;
pub mod runner;
pub mod secret;
pub mod sync;

pub use client::Client;
pub use config::Config;
pub use error::{Error, Result};
pub use repo::{Strategy, WorkingCopy};
pub use sync::{PickRequest, Syncer};
