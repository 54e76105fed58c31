//! # Configuration Schema and Parsing
//!
//! This module defines the YAML configuration file of the bot and the logic
//! for loading it. Every field is optional; an empty file yields a
//! configuration that clones from `https://gitcode.com` into the platform
//! cache directory.
//!
//! ## Key Components
//!
//! - **`Config`**: the whole file.
//! - **`LargeRepo`**: one repository that needs shallow clones, an optional
//!   canonical fork owner, and an optional mirror to repair cold starts.
//! - **`LargeRepos`**: the lookup set built from those entries. It is the
//!   only place the crate learns whether a repository is large, so the clone
//!   path and the prewarm routine cannot disagree.
//!
//! ## Example
//!
//! ```yaml
//! host: gitcode.com
//! cache_root: /var/cache/sync-bot
//! credentials:
//!   user: sync-bot
//!   token_file: /etc/sync-bot/token
//! retry:
//!   attempts: 5
//!   initial_delay_ms: 1000
//! large_repos:
//!   - name: openeuler/kernel
//!     fork_owner: sync-bot-forks
//!     skip_refresh: true
//!     mirror: https://mirror.example.com/kernel.git
//! ```

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::defaults;
use crate::error::{Error, Result};
use crate::runner::RetryPolicy;

/// The bot's configuration file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Code-hosting host, used to build authenticated URLs.
    pub host: String,
    /// Base for remote URLs. Defaults to `https://<host>`; a `file://` base
    /// points the bot at local bare repositories.
    pub base_url: Option<String>,
    /// Directory holding one working copy per `owner/repo`.
    pub cache_root: Option<PathBuf>,
    /// Explicit path to the git executable.
    pub git: Option<PathBuf>,
    pub credentials: CredentialsConfig,
    pub retry: RetryConfig,
    pub identity: Identity,
    pub large_repos: Vec<LargeRepo>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: defaults::DEFAULT_HOST.to_string(),
            base_url: None,
            cache_root: None,
            git: None,
            credentials: CredentialsConfig::default(),
            retry: RetryConfig::default(),
            identity: Identity::default(),
            large_repos: Vec::new(),
        }
    }
}

/// Where the push/pull identity comes from.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CredentialsConfig {
    pub user: Option<String>,
    /// File containing the token. Surrounding whitespace is ignored.
    pub token_file: Option<PathBuf>,
}

impl CredentialsConfig {
    /// Read the configured user and token, if both are configured.
    pub fn load(&self) -> Result<Option<(String, Vec<u8>)>> {
        match (&self.user, &self.token_file) {
            (Some(user), Some(path)) => {
                let token = fs::read(path)?;
                Ok(Some((user.clone(), token)))
            }
            (None, None) => Ok(None),
            _ => Err(Error::ConfigParse {
                message: "credentials need both 'user' and 'token_file'".to_string(),
                hint: Some("set both keys or remove the credentials section".to_string()),
            }),
        }
    }
}

/// Backoff settings for network commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RetryConfig {
    pub attempts: u32,
    pub initial_delay_ms: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            attempts: 5,
            initial_delay_ms: 1000,
        }
    }
}

impl RetryConfig {
    pub fn policy(&self) -> RetryPolicy {
        RetryPolicy::new(self.attempts, Duration::from_millis(self.initial_delay_ms))
    }
}

/// Committer identity written into a working copy that has none.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Identity {
    pub name: String,
    pub email: String,
}

impl Default for Identity {
    fn default() -> Self {
        Self {
            name: defaults::DEFAULT_IDENTITY_NAME.to_string(),
            email: defaults::DEFAULT_IDENTITY_EMAIL.to_string(),
        }
    }
}

/// A repository too big for full clones.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LargeRepo {
    /// `owner/repo` identifier.
    pub name: String,
    /// Owner of the fork that clones, pushes and sync branches go through.
    #[serde(default)]
    pub fork_owner: Option<String>,
    /// Reuse the cached working copy without fetching on every request.
    #[serde(default)]
    pub skip_refresh: bool,
    /// Clone depth.
    #[serde(default = "default_depth")]
    pub depth: u32,
    /// Substitute remote used by prewarm when the primary fetch fails.
    #[serde(default)]
    pub mirror: Option<String>,
}

fn default_depth() -> u32 {
    defaults::LARGE_REPO_DEPTH
}

impl LargeRepo {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            fork_owner: None,
            skip_refresh: false,
            depth: defaults::LARGE_REPO_DEPTH,
            mirror: None,
        }
    }

    pub fn owner(&self) -> &str {
        self.name.split_once('/').map(|(o, _)| o).unwrap_or("")
    }

    pub fn repo(&self) -> &str {
        self.name.split_once('/').map(|(_, r)| r).unwrap_or("")
    }

    /// The owner whose copy of the repository is cloned and pushed to.
    pub fn remote_owner(&self) -> &str {
        self.fork_owner.as_deref().unwrap_or_else(|| self.owner())
    }
}

/// Membership set of large repositories, keyed by `owner/repo`.
#[derive(Debug, Clone, Default)]
pub struct LargeRepos {
    repos: HashMap<String, LargeRepo>,
}

impl LargeRepos {
    pub fn new(repos: impl IntoIterator<Item = LargeRepo>) -> Self {
        Self {
            repos: repos.into_iter().map(|r| (r.name.clone(), r)).collect(),
        }
    }

    pub fn get(&self, owner: &str, repo: &str) -> Option<&LargeRepo> {
        self.repos.get(&format!("{}/{}", owner, repo))
    }

    pub fn contains(&self, owner: &str, repo: &str) -> bool {
        self.get(owner, repo).is_some()
    }

    pub fn iter(&self) -> impl Iterator<Item = &LargeRepo> {
        self.repos.values()
    }

    pub fn len(&self) -> usize {
        self.repos.len()
    }

    pub fn is_empty(&self) -> bool {
        self.repos.is_empty()
    }
}

/// Split an `owner/repo` identifier.
pub fn split_repo_id(id: &str) -> Result<(&str, &str)> {
    match id.split_once('/') {
        Some((owner, repo))
            if !owner.is_empty() && !repo.is_empty() && !repo.contains('/') =>
        {
            Ok((owner, repo))
        }
        _ => Err(Error::InvalidRepository {
            name: id.to_string(),
        }),
    }
}

impl Config {
    /// Parse a configuration from YAML text.
    pub fn parse(yaml_content: &str) -> Result<Self> {
        let config: Config = if yaml_content.trim().is_empty() {
            Config::default()
        } else {
            serde_yaml::from_str(yaml_content)?
        };
        config.validate()?;
        Ok(config)
    }

    /// Read and parse a configuration file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Self::parse(&content)
    }

    fn validate(&self) -> Result<()> {
        if self.host.is_empty() {
            return Err(Error::ConfigParse {
                message: "host must not be empty".to_string(),
                hint: None,
            });
        }
        if self.retry.attempts == 0 {
            return Err(Error::ConfigParse {
                message: "retry.attempts must be at least 1".to_string(),
                hint: None,
            });
        }
        for repo in &self.large_repos {
            if split_repo_id(&repo.name).is_err() {
                return Err(Error::ConfigParse {
                    message: format!("large repository '{}' is not owner/repo", repo.name),
                    hint: Some("write it as 'owner/repo', e.g. 'openeuler/kernel'".to_string()),
                });
            }
            if repo.depth == 0 {
                return Err(Error::ConfigParse {
                    message: format!("large repository '{}' has depth 0", repo.name),
                    hint: None,
                });
            }
        }
        Ok(())
    }

    /// Base of every remote URL, without a trailing slash.
    pub fn base_url(&self) -> String {
        self.base_url
            .clone()
            .unwrap_or_else(|| format!("https://{}", self.host))
            .trim_end_matches('/')
            .to_string()
    }

    pub fn cache_root(&self) -> PathBuf {
        self.cache_root
            .clone()
            .unwrap_or_else(defaults::default_cache_root)
    }

    pub fn large_repo_set(&self) -> LargeRepos {
        LargeRepos::new(self.large_repos.iter().cloned())
    }
}
