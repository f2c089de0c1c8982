//! Bounded in-process TTL cache for upstream responses.
//!
//! Cache failures are never allowed to reach the ranking path: a
//! serialization error skips the write, a corrupt entry reads as a miss.
//! Stale entries are kept around until evicted so they can serve as a
//! fallback when the upstream is down.

use chrono::Utc;
use dashmap::DashMap;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, warn};

use crate::TARGET_CACHE;

/// A cached payload with its expiry timestamp (epoch milliseconds).
#[derive(Debug, Clone)]
pub struct CacheEntry {
    pub data: Value,
    pub expiry: i64,
}

/// Concurrent TTL cache with a bounded entry count. Last writer wins under
/// concurrent use of the same key.
pub struct ResponseCache {
    entries: DashMap<String, CacheEntry>,
    max_entries: usize,
}

impl ResponseCache {
    pub fn new(max_entries: usize) -> Self {
        Self {
            entries: DashMap::new(),
            max_entries: max_entries.max(1),
        }
    }

    /// Returns the entry for `key` if it exists and has not expired.
    pub fn get_fresh<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        // Clone the payload out so the map guard is released before any
        // corrupt-entry removal in decode.
        let data = {
            let entry = self.entries.get(key)?;
            if Utc::now().timestamp_millis() >= entry.expiry {
                return None;
            }
            entry.data.clone()
        };
        self.decode(key, &data)
    }

    /// Returns the entry for `key` regardless of expiry. Used as a fallback
    /// when the upstream fails.
    pub fn get_stale<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let data = {
            let entry = self.entries.get(key)?;
            entry.data.clone()
        };
        self.decode(key, &data)
    }

    /// Stores `value` under `key` with the given TTL. Never fails: a value
    /// that cannot be serialized is simply not cached.
    pub fn store<T: Serialize>(&self, key: &str, value: &T, ttl_ms: i64) {
        let data = match serde_json::to_value(value) {
            Ok(data) => data,
            Err(err) => {
                warn!(target: TARGET_CACHE, "Skipping cache write for \"{}\": {}", key, err);
                return;
            }
        };

        if self.entries.len() >= self.max_entries && !self.entries.contains_key(key) {
            self.evict_for_space();
        }

        let expiry = Utc::now().timestamp_millis() + ttl_ms.max(0);
        self.entries.insert(key.to_string(), CacheEntry { data, expiry });
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn decode<T: DeserializeOwned>(&self, key: &str, data: &Value) -> Option<T> {
        match serde_json::from_value(data.clone()) {
            Ok(value) => Some(value),
            Err(err) => {
                warn!(target: TARGET_CACHE, "Dropping corrupt cache entry \"{}\": {}", key, err);
                self.entries.remove(key);
                None
            }
        }
    }

    /// Drops expired entries first; if that frees nothing, drops an
    /// arbitrary batch so writes keep succeeding under pressure.
    fn evict_for_space(&self) {
        let now = Utc::now().timestamp_millis();
        let before = self.entries.len();
        self.entries.retain(|_, entry| entry.expiry > now);

        if self.entries.len() >= self.max_entries {
            let batch: Vec<String> = self
                .entries
                .iter()
                .take(self.max_entries / 4 + 1)
                .map(|entry| entry.key().clone())
                .collect();
            for key in batch {
                self.entries.remove(&key);
            }
        }

        debug!(
            target: TARGET_CACHE,
            "Evicted {} cache entries under pressure",
            before - self.entries.len()
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fresh_roundtrip() {
        let cache = ResponseCache::new(16);
        cache.store("key", &vec![1, 2, 3], 60_000);
        assert_eq!(cache.get_fresh::<Vec<i32>>("key"), Some(vec![1, 2, 3]));
    }

    #[test]
    fn test_expired_entry_misses_but_serves_stale() {
        let cache = ResponseCache::new(16);
        cache.store("key", &"payload".to_string(), 0);
        assert_eq!(cache.get_fresh::<String>("key"), None);
        assert_eq!(cache.get_stale::<String>("key"), Some("payload".to_string()));
    }

    #[test]
    fn test_type_mismatch_reads_as_miss() {
        let cache = ResponseCache::new(16);
        cache.store("key", &"not a number".to_string(), 60_000);
        assert_eq!(cache.get_fresh::<u32>("key"), None);
        // The corrupt entry is gone afterwards.
        assert!(cache.is_empty());
    }

    #[test]
    fn test_capacity_stays_bounded() {
        let cache = ResponseCache::new(8);
        for i in 0..50 {
            cache.store(&format!("key-{}", i), &i, 60_000);
        }
        assert!(cache.len() <= 8);
        // Writes still succeed after eviction.
        cache.store("late", &99, 60_000);
        assert_eq!(cache.get_fresh::<i32>("late"), Some(99));
    }

    #[test]
    fn test_overwrite_is_last_writer_wins() {
        let cache = ResponseCache::new(16);
        cache.store("key", &1, 60_000);
        cache.store("key", &2, 60_000);
        assert_eq!(cache.get_fresh::<i32>("key"), Some(2));
    }
}
