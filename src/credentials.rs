//! Push/pull identity shared by every network operation.

use std::fmt;
use std::sync::RwLock;

use crate::error::{Error, Result};
use crate::secret::MASK;

/// A user and token pair used to authenticate against the remote.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct Credentials {
    pub user: String,
    pub token: String,
}

impl Credentials {
    pub fn new(user: impl Into<String>, token: impl Into<String>) -> Self {
        Self {
            user: user.into(),
            token: token.into(),
        }
    }

    /// Both the user and the token are present.
    pub fn is_complete(&self) -> bool {
        !self.user.is_empty() && !self.token.is_empty()
    }
}

// The token must never end up in a log line through `{:?}`.
impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("user", &self.user)
            .field("token", &if self.token.is_empty() { "" } else { MASK })
            .finish()
    }
}

/// Credentials behind a read/write lock: written once at startup, read by
/// every clone, fetch and push.
#[derive(Debug, Default)]
pub struct CredentialStore {
    inner: RwLock<Credentials>,
}

impl CredentialStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the stored credentials. The token arrives as raw bytes, the
    /// way it is read from a secret file; surrounding whitespace is dropped.
    pub fn set(&self, user: &str, token: &[u8]) -> Result<()> {
        let token = String::from_utf8_lossy(token).trim().to_string();
        let mut guard = self.inner.write().map_err(|_| Error::LockPoisoned {
            context: "credential store".to_string(),
        })?;
        *guard = Credentials::new(user.trim(), token);
        Ok(())
    }

    /// A snapshot of the current credentials.
    pub fn get(&self) -> Result<Credentials> {
        self.inner
            .read()
            .map(|guard| guard.clone())
            .map_err(|_| Error::LockPoisoned {
                context: "credential store".to_string(),
            })
    }
}
