//! Bounded first-in first-out map

use std::hash::Hash;
use std::num::NonZeroUsize;

use lru::LruCache;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

use crate::error::{CacheError, Result};
use crate::metrics::{CacheMetrics, CacheStats};

/// Cache configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheConfig {
    /// Maximum number of entries per resource family
    #[serde(default = "default_capacity")]
    pub capacity: usize,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            capacity: default_capacity(),
        }
    }
}

impl CacheConfig {
    pub fn with_capacity(capacity: usize) -> Self {
        Self { capacity }
    }

    /// Capacity as a non-zero count
    pub fn validated_capacity(&self) -> Result<NonZeroUsize> {
        NonZeroUsize::new(self.capacity).ok_or(CacheError::InvalidCapacity {
            capacity: self.capacity,
        })
    }
}

fn default_capacity() -> usize {
    1024
}

/// Map holding at most `capacity` entries, evicting the oldest insert first
///
/// Lookups never reorder entries, so eviction follows insertion order only.
/// Inserting a key that is already present keeps the original entry and its
/// position. Safe for concurrent use; the lock is never held across an await.
pub struct BoundedCache<K, V> {
    entries: Mutex<LruCache<K, V>>,
    metrics: CacheMetrics,
}

impl<K: Hash + Eq + Clone, V: Clone> BoundedCache<K, V> {
    pub fn new(capacity: NonZeroUsize) -> Self {
        Self {
            entries: Mutex::new(LruCache::new(capacity)),
            metrics: CacheMetrics::new(),
        }
    }

    /// Cached value for `key`, recorded as a hit or a miss
    pub fn get(&self, key: &K) -> Option<V> {
        let value = self.entries.lock().peek(key).cloned();
        match value {
            Some(_) => self.metrics.record_hit(),
            None => self.metrics.record_miss(),
        }
        value
    }

    /// Whether `key` is cached, without touching the metrics
    pub fn contains(&self, key: &K) -> bool {
        self.entries.lock().contains(key)
    }

    /// Insert `value` under `key`, returning the evicted key if the cache was full
    pub fn insert(&self, key: K, value: V) -> Option<K> {
        let mut entries = self.entries.lock();
        if entries.contains(&key) {
            return None;
        }

        self.metrics.record_insert();
        let evicted = entries.push(key, value).map(|(evicted, _)| evicted);
        if evicted.is_some() {
            self.metrics.record_eviction();
        }
        evicted
    }

    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.entries.lock().cap().get()
    }

    /// Cached keys, oldest insert first
    pub fn keys(&self) -> Vec<K> {
        self.entries
            .lock()
            .iter()
            .rev()
            .map(|(key, _)| key.clone())
            .collect()
    }

    pub fn stats(&self) -> CacheStats {
        self.metrics.snapshot(self.len())
    }

    /// Zero the counters; cached entries stay
    pub fn reset_stats(&self) {
        self.metrics.reset();
    }
}
