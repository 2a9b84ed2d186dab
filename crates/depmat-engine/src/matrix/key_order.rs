//! Concurrent insertion-ordered set of phase keys.
//!
//! A key is appended while its membership shard is locked, so each key is
//! appended exactly once, and a key whose insertion completed before another
//! began always precedes it.

use std::sync::{Mutex, PoisonError};

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use rustc_hash::FxBuildHasher;

use crate::phase::PhaseId;

#[derive(Debug)]
pub struct KeyOrder {
    seen: DashMap<PhaseId, (), FxBuildHasher>,
    order: Mutex<Vec<PhaseId>>,
}

impl KeyOrder {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            seen: DashMap::with_capacity_and_hasher(capacity, FxBuildHasher),
            order: Mutex::new(Vec::with_capacity(capacity)),
        }
    }

    /// Append `key` if absent. Returns true if it was appended.
    pub fn insert(&self, key: PhaseId) -> bool {
        if self.seen.contains_key(&key) {
            return false;
        }
        match self.seen.entry(key) {
            Entry::Occupied(_) => false,
            Entry::Vacant(slot) => {
                self.order
                    .lock()
                    .unwrap_or_else(PoisonError::into_inner)
                    .push(key);
                slot.insert(());
                true
            }
        }
    }

    pub fn contains(&self, key: &PhaseId) -> bool {
        self.seen.contains_key(key)
    }

    /// Keys in first-insertion order.
    pub fn snapshot(&self) -> Vec<PhaseId> {
        self.order
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn len(&self) -> usize {
        self.seen.len()
    }

    pub fn is_empty(&self) -> bool {
        self.seen.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use depmat_core::PhaseKindInterner;

    #[test]
    fn duplicates_keep_first_position() {
        let kinds = PhaseKindInterner::new();
        let a = PhaseId::new(kinds.intern("A"), 0);
        let b = PhaseId::new(kinds.intern("B"), 0);
        let order = KeyOrder::with_capacity(4);

        assert!(order.insert(b));
        assert!(order.insert(a));
        assert!(!order.insert(b));
        assert_eq!(order.snapshot(), vec![b, a]);
        assert_eq!(order.len(), 2);
    }
}
