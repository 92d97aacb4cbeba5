//! Time-bounded result cache.
//!
//! Uses DashMap for concurrent access without a global lock. Entries carry
//! an absolute deadline and are dropped lazily on lookup or by
//! `purge_expired`.

use std::hash::Hash;
use std::time::Duration;

use dashmap::DashMap;
use tokio::time::Instant;

use crate::telemetry;

struct CacheEntry<V> {
    value: V,
    expires_at: Instant,
}

/// Key/value cache where every entry lives for a fixed TTL.
///
/// A zero TTL disables the cache: inserts are ignored and every lookup
/// misses. Reads never extend an entry's lifetime.
pub struct TtlCache<K, V> {
    name: String,
    entries: DashMap<K, CacheEntry<V>>,
    ttl: Duration,
}

impl<K, V> TtlCache<K, V>
where
    K: Eq + Hash,
    V: Clone,
{
    pub fn new(name: impl Into<String>, ttl: Duration) -> Self {
        Self {
            name: name.into(),
            entries: DashMap::new(),
            ttl,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    pub fn is_enabled(&self) -> bool {
        !self.ttl.is_zero()
    }

    /// Return the live value for `key`, dropping it if it has expired.
    pub fn get(&self, key: &K) -> Option<V> {
        let now = Instant::now();
        let live = self.entries.get(key).and_then(|entry| {
            (now < entry.expires_at).then(|| entry.value.clone())
        });

        if live.is_none() {
            // The read guard is released above; removing under it would deadlock.
            self.entries.remove_if(key, |_, entry| now >= entry.expires_at);
        }

        telemetry::record_cache_lookup(&self.name, live.is_some());
        live
    }

    /// Store `value` until `now + ttl`, replacing any previous entry.
    pub fn insert(&self, key: K, value: V) {
        if !self.is_enabled() {
            return;
        }
        let expires_at = Instant::now() + self.ttl;
        self.entries.insert(key, CacheEntry { value, expires_at });
    }

    pub fn remove(&self, key: &K) -> Option<V> {
        self.entries.remove(key).map(|(_, entry)| entry.value)
    }

    /// Remove expired entries. Returns how many were dropped.
    pub fn purge_expired(&self) -> usize {
        let now = Instant::now();
        let before = self.entries.len();
        self.entries.retain(|_, entry| now < entry.expires_at);
        before.saturating_sub(self.entries.len())
    }

    /// Number of stored entries, including expired ones not yet purged.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<K: Eq + Hash, V> std::fmt::Debug for TtlCache<K, V> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TtlCache")
            .field("name", &self.name)
            .field("ttl", &self.ttl)
            .field("entries", &self.entries.len())
            .finish()
    }
}
