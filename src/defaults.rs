//! Default values for sync-bot configuration.
//!
//! This module provides centralized default values used by the configuration
//! file and the CLI, ensuring consistency and avoiding duplication.

use std::path::PathBuf;

/// Code-hosting host used when the configuration names none.
pub const DEFAULT_HOST: &str = "gitcode.com";

/// Committer name written into working copies that have none.
pub const DEFAULT_IDENTITY_NAME: &str = "sync-bot";

/// Committer email written into working copies that have none.
pub const DEFAULT_IDENTITY_EMAIL: &str = "sync-bot@local";

/// Clone depth for large repositories.
pub const LARGE_REPO_DEPTH: u32 = 50;

/// Returns the default cache root directory.
///
/// Uses the platform-appropriate cache directory:
/// - Linux: `~/.cache/sync-bot/repos` (XDG Base Directory)
/// - macOS: `~/Library/Caches/sync-bot/repos`
/// - Windows: `{FOLDERID_LocalAppData}\sync-bot\repos`
///
/// Falls back to `repos` in the current directory if the platform cache
/// directory cannot be determined.
pub fn default_cache_root() -> PathBuf {
    dirs::cache_dir()
        .map(|dir| dir.join("sync-bot").join("repos"))
        .unwrap_or_else(|| PathBuf::from("repos"))
}
