//! Bounded memo cache
//!
//! Selector results are cached under keys that include the addresses of the
//! table `Arc`s they were computed from, so a cache hit is only possible while
//! every input table is still the same allocation. Lookup and insert are
//! separate calls on purpose: the lock is never held while a selector
//! computes, which keeps recursive selectors (reply resolution) safe.

use std::collections::HashMap;
use std::hash::Hash;

use parking_lot::Mutex;

/// Cache with a hard entry cap; filling past the cap evicts everything.
/// Keys embed input-table addresses, so after a few dispatches most entries
/// are unreachable anyway.
pub struct Memo<K, V> {
    entries: Mutex<HashMap<K, V>>,
    capacity: usize,
}

impl<K: Eq + Hash, V: Clone> Memo<K, V> {
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            capacity,
        }
    }

    pub fn get(&self, key: &K) -> Option<V> {
        self.entries.lock().get(key).cloned()
    }

    pub fn insert(&self, key: K, value: V) {
        let mut entries = self.entries.lock();
        if entries.len() >= self.capacity && !entries.contains_key(&key) {
            entries.clear();
        }
        entries.insert(key, value);
    }

    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }
}
