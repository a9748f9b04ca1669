//! Specialized collection types

use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

pub use slotmap::{SlotMap, DefaultKey};

/// Handle-based map using slot map for stable references
pub type HandleMap<T> = SlotMap<DefaultKey, T>;

/// Handle type for stable references
pub type Handle = DefaultKey;

/// Data shared between a producer component and its consumers.
///
/// The producer keeps one clone, the message bus hands out the others.
#[derive(Debug, Default)]
pub struct Shared<T> {
    inner: Arc<RwLock<T>>,
}

impl<T> Clone for Shared<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

/// Lock was poisoned by a panicking writer
#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("shared data lock poisoned")]
pub struct PoisonedLock;

impl<T> Shared<T> {
    /// Wrap a value for shared access
    pub fn new(value: T) -> Self {
        Self {
            inner: Arc::new(RwLock::new(value)),
        }
    }

    /// Acquire read access
    pub fn read(&self) -> Result<RwLockReadGuard<'_, T>, PoisonedLock> {
        self.inner.read().map_err(|_| PoisonedLock)
    }

    /// Acquire exclusive write access
    pub fn write(&self) -> Result<RwLockWriteGuard<'_, T>, PoisonedLock> {
        self.inner.write().map_err(|_| PoisonedLock)
    }

    /// Read access for callbacks that cannot report errors; poisoning is ignored
    pub fn read_unpoisoned(&self) -> RwLockReadGuard<'_, T> {
        self.inner.read().unwrap_or_else(PoisonError::into_inner)
    }

    /// Whether both handles point at the same storage
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

impl<T: Clone> Shared<T> {
    /// Clone the current value out of the lock
    pub fn snapshot(&self) -> Result<T, PoisonedLock> {
        self.read().map(|guard| guard.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clones_share_storage() {
        let a = Shared::new(vec![1, 2, 3]);
        let b = a.clone();

        b.write().unwrap().push(4);

        assert_eq!(a.snapshot().unwrap(), vec![1, 2, 3, 4]);
        assert!(a.ptr_eq(&b));
        assert!(!a.ptr_eq(&Shared::new(vec![1, 2, 3, 4])));
    }
}
