//! Deduplication index: dedup key to outstanding request.
//!
//! Entries live only while a request is outstanding. With deduplication
//! disabled the index stays empty and every submission is independent.

use std::collections::HashMap;
use std::hash::Hash;

use super::pending::RequestId;

pub struct DedupIndex<D> {
    entries: HashMap<D, RequestId>,
    enabled: bool,
}

impl<D: Eq + Hash> DedupIndex<D> {
    pub fn new(enabled: bool) -> Self {
        Self { entries: HashMap::new(), enabled }
    }

    /// Outstanding request for `key`, if any.
    pub fn lookup(&self, key: &D) -> Option<RequestId> {
        if !self.enabled {
            return None;
        }
        self.entries.get(key).copied()
    }

    pub fn register(&mut self, key: D, id: RequestId) {
        if self.enabled {
            self.entries.insert(key, id);
        }
    }

    /// Remove `key` if it still maps to `id`.
    pub fn release(&mut self, key: &D, id: RequestId) {
        if self.entries.get(key) == Some(&id) {
            self.entries.remove(key);
        }
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.entries.len()
    }
}
