//! Expiring key/value cache
//!
//! Callers pass the current `Instant` on every access, so expiry is fully
//! deterministic and the cache never reads a clock on its own.

use std::collections::HashMap;
use std::hash::Hash;
use std::time::{Duration, Instant};

#[derive(Debug, Clone)]
struct Entry<V> {
    value: V,
    expires_at: Instant,
}

/// Cache whose entries expire a fixed time after insertion
#[derive(Debug, Clone)]
pub struct TtlCache<K, V> {
    ttl: Duration,
    entries: HashMap<K, Entry<V>>,
}

impl<K: Eq + Hash, V> TtlCache<K, V> {
    /// Create a cache with the given time to live
    #[must_use]
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            entries: HashMap::new(),
        }
    }

    /// Time to live of new entries
    #[must_use]
    pub const fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Live value for `key`, or `None` if absent or expired
    #[must_use]
    pub fn get(&self, key: &K, now: Instant) -> Option<&V> {
        self.entries
            .get(key)
            .filter(|entry| now < entry.expires_at)
            .map(|entry| &entry.value)
    }

    /// Insert or refresh `key`
    pub fn insert(&mut self, key: K, value: V, now: Instant) {
        let expires_at = now + self.ttl;
        self.entries.insert(key, Entry { value, expires_at });
    }

    /// Drop one entry
    pub fn invalidate(&mut self, key: &K) -> Option<V> {
        self.entries.remove(key).map(|entry| entry.value)
    }

    /// Drop every entry
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Drop expired entries, returning how many were removed
    pub fn purge_expired(&mut self, now: Instant) -> usize {
        let before = self.entries.len();
        self.entries.retain(|_, entry| now < entry.expires_at);
        before - self.entries.len()
    }

    /// Number of stored entries, expired ones included
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether nothing is stored
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entry_expires() {
        let start = Instant::now();
        let mut cache = TtlCache::new(Duration::from_secs(60));
        cache.insert("Smith", 4.2_f32, start);

        assert_eq!(cache.get(&"Smith", start + Duration::from_secs(59)), Some(&4.2));
        assert_eq!(cache.get(&"Smith", start + Duration::from_secs(60)), None);
    }

    #[test]
    fn test_reinsert_refreshes() {
        let start = Instant::now();
        let mut cache = TtlCache::new(Duration::from_secs(10));
        cache.insert(1, "a", start);
        cache.insert(1, "b", start + Duration::from_secs(8));
        assert_eq!(cache.get(&1, start + Duration::from_secs(15)), Some(&"b"));
    }

    #[test]
    fn test_purge_and_invalidate() {
        let start = Instant::now();
        let mut cache = TtlCache::new(Duration::from_secs(5));
        cache.insert("a", 1, start);
        cache.insert("b", 2, start + Duration::from_secs(4));
        assert_eq!(cache.purge_expired(start + Duration::from_secs(6)), 1);
        assert_eq!(cache.len(), 1);
        assert_eq!(cache.invalidate(&"b"), Some(2));
        assert!(cache.is_empty());
    }
}
