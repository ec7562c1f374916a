//! Keyed lock registries.
//!
//! One lock per key, created on first use. Entries nobody holds can be
//! dropped with [`LockTable::prune`].

use std::collections::HashMap;
use std::hash::Hash;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

pub(crate) struct LockTable<K, L> {
    locks: Mutex<HashMap<K, Arc<L>>>,
}

impl<K: Eq + Hash + Clone, L: Default> LockTable<K, L> {
    pub fn new() -> Self {
        Self {
            locks: Mutex::new(HashMap::new()),
        }
    }

    /// The lock for `key`.
    pub fn get(&self, key: &K) -> Arc<L> {
        // The map is only ever inserted into or pruned, so it stays
        // consistent even if a holder panicked.
        let mut locks = self.locks.lock().unwrap_or_else(PoisonError::into_inner);
        locks.entry(key.clone()).or_default().clone()
    }

    /// Drop locks no caller currently holds a handle to.
    pub fn prune(&self) -> usize {
        let mut locks = self.locks.lock().unwrap_or_else(PoisonError::into_inner);
        let before = locks.len();
        locks.retain(|_, lock| Arc::strong_count(lock) > 1);
        before - locks.len()
    }

    pub fn len(&self) -> usize {
        self.locks.lock().unwrap_or_else(PoisonError::into_inner).len()
    }
}

// The guarded data is `()`, so a poisoned lock protects nothing broken.

pub(crate) fn exclusive(lock: &Mutex<()>) -> MutexGuard<'_, ()> {
    lock.lock().unwrap_or_else(PoisonError::into_inner)
}

pub(crate) fn read(lock: &RwLock<()>) -> RwLockReadGuard<'_, ()> {
    lock.read().unwrap_or_else(PoisonError::into_inner)
}

pub(crate) fn write(lock: &RwLock<()>) -> RwLockWriteGuard<'_, ()> {
    lock.write().unwrap_or_else(PoisonError::into_inner)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_key_same_lock() {
        let table: LockTable<u32, Mutex<()>> = LockTable::new();
        let a = table.get(&1);
        let b = table.get(&1);
        assert!(Arc::ptr_eq(&a, &b));
        assert!(!Arc::ptr_eq(&a, &table.get(&2)));
    }

    #[test]
    fn prune_keeps_held_locks() {
        let table: LockTable<u32, RwLock<()>> = LockTable::new();
        let held = table.get(&1);
        let _ = table.get(&2);
        assert_eq!(table.prune(), 1);
        assert_eq!(table.len(), 1);
        drop(held);
        assert_eq!(table.prune(), 1);
        assert_eq!(table.len(), 0);
    }
}
