//! Per-repository mutual exclusion.
//!
//! Checkout, cherry-pick and push mutate a shared working copy with no
//! isolation of their own, so at most one sequence may run against a given
//! repository at a time. Locks are created on first use and kept for the
//! life of the process. The map has its own short-lived lock, so creating a
//! lock for a new repository never waits on a repository that is busy.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// Registry mapping `owner/repo` identifiers to their dedicated lock.
#[derive(Debug, Default)]
pub struct RepoLocks {
    locks: Mutex<HashMap<String, Arc<Mutex<()>>>>,
}

impl RepoLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// The lock for `id`, created if this is the first request for it.
    pub fn lock_for(&self, id: &str) -> Arc<Mutex<()>> {
        let mut locks = self.locks.lock().unwrap_or_else(PoisonError::into_inner);
        Arc::clone(locks.entry(id.to_string()).or_default())
    }

    /// Number of repositories seen so far. Never decreases.
    pub fn len(&self) -> usize {
        self.locks
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Acquire a repository lock. A holder that panicked left the working copy in
/// an unknown state, which the next operation cleans anyway, so poisoning is
/// ignored.
pub fn acquire(lock: &Mutex<()>) -> MutexGuard<'_, ()> {
    lock.lock().unwrap_or_else(PoisonError::into_inner)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    #[test]
    fn test_same_id_same_lock() {
        let locks = RepoLocks::new();
        let a = locks.lock_for("openeuler/kernel");
        let b = locks.lock_for("openeuler/kernel");
        assert!(Arc::ptr_eq(&a, &b));
        assert_eq!(locks.len(), 1);
    }

    #[test]
    fn test_distinct_ids_distinct_locks() {
        let locks = RepoLocks::new();
        assert!(locks.is_empty());
        let a = locks.lock_for("o/a");
        let b = locks.lock_for("o/b");
        assert!(!Arc::ptr_eq(&a, &b));
        let _held = acquire(&a);
        // A busy repository does not block another one.
        assert!(b.try_lock().is_ok());
        assert_eq!(locks.len(), 2);
    }

    #[test]
    fn test_poisoned_lock_is_recovered() {
        let locks = RepoLocks::new();
        let lock = locks.lock_for("o/r");
        let poisoner = Arc::clone(&lock);
        let _ = thread::spawn(move || {
            let _guard = poisoner.lock().unwrap();
            panic!("holder died");
        })
        .join();
        assert!(lock.is_poisoned());
        let _guard = acquire(&lock);
    }
}
