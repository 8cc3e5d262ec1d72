//! Body scroll lock shared by the modal surfaces
//!
//! The menu and the lightbox both need the page body frozen while they are
//! open. The lock tracks *who* holds it, so one surface closing never unlocks
//! the page while another is still open.

use std::collections::BTreeSet;

use serde::Serialize;
use tracing::debug;

/// A surface that can hold the scroll lock
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LockHolder {
    Menu,
    Lightbox,
}

/// Set of surfaces currently holding the body scroll lock
#[derive(Debug, Default, Clone)]
pub struct ScrollLock {
    holders: BTreeSet<LockHolder>,
}

impl ScrollLock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Take the lock on behalf of `holder`. Returns false if it already held it.
    pub fn acquire(&mut self, holder: LockHolder) -> bool {
        let inserted = self.holders.insert(holder);
        if inserted {
            debug!(?holder, holders = self.holders.len(), "scroll lock acquired");
        }
        inserted
    }

    /// Drop `holder`'s claim. The page only unlocks once no holder remains.
    pub fn release(&mut self, holder: LockHolder) -> bool {
        let removed = self.holders.remove(&holder);
        if removed {
            debug!(?holder, holders = self.holders.len(), "scroll lock released");
        }
        removed
    }

    /// Whether the body must not scroll
    pub fn is_locked(&self) -> bool {
        !self.holders.is_empty()
    }

    pub fn is_held_by(&self, holder: LockHolder) -> bool {
        self.holders.contains(&holder)
    }

    pub fn holders(&self) -> impl Iterator<Item = LockHolder> + '_ {
        self.holders.iter().copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lock_released_only_when_all_holders_leave() {
        let mut lock = ScrollLock::new();
        lock.acquire(LockHolder::Menu);
        lock.acquire(LockHolder::Lightbox);

        lock.release(LockHolder::Lightbox);
        assert!(lock.is_locked());
        assert!(lock.is_held_by(LockHolder::Menu));

        lock.release(LockHolder::Menu);
        assert!(!lock.is_locked());
    }

    #[test]
    fn test_acquire_and_release_are_idempotent() {
        let mut lock = ScrollLock::new();
        assert!(lock.acquire(LockHolder::Menu));
        assert!(!lock.acquire(LockHolder::Menu));
        assert_eq!(lock.holders().count(), 1);

        assert!(lock.release(LockHolder::Menu));
        assert!(!lock.release(LockHolder::Menu));
        assert!(!lock.is_locked());
    }
}
