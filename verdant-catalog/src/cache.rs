//! Bounded TTL cache for normalized catalog lookups

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

struct CacheEntry<V> {
    value: V,
    stored_at: Instant,
}

/// Key-value store with time-based expiry and size-based eviction.
///
/// Expired entries are removed on read, not merely hidden. When an insert
/// would exceed `max_size`, the single oldest entry by `stored_at` is evicted
/// first (staleness order, not LRU: reads do not refresh an entry). All
/// operations take one short-lived mutex and never error.
pub struct TtlCache<V> {
    ttl: Duration,
    max_size: usize,
    entries: Mutex<HashMap<String, CacheEntry<V>>>,
}

impl<V: Clone> TtlCache<V> {
    pub fn new(ttl: Duration, max_size: usize) -> Self {
        TtlCache {
            ttl,
            max_size: max_size.max(1),
            entries: Mutex::new(HashMap::new()),
        }
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<String, CacheEntry<V>>> {
        // The map is valid in any state a panicking holder left it in.
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Return the unexpired value for `key`, removing it if it has expired.
    pub fn get(&self, key: &str) -> Option<V> {
        let mut entries = self.lock();
        match entries.get(key) {
            Some(entry) if entry.stored_at.elapsed() < self.ttl => Some(entry.value.clone()),
            Some(_) => {
                entries.remove(key);
                None
            }
            None => None,
        }
    }

    /// Insert `value` under `key`, evicting the oldest entry at capacity.
    ///
    /// Overwriting an existing key never evicts another entry.
    pub fn set(&self, key: impl Into<String>, value: V) {
        let key = key.into();
        let mut entries = self.lock();
        if !entries.contains_key(&key) && entries.len() >= self.max_size {
            let oldest = entries
                .iter()
                .min_by_key(|(_, entry)| entry.stored_at)
                .map(|(key, _)| key.clone());
            if let Some(oldest) = oldest {
                entries.remove(&oldest);
            }
        }
        entries.insert(
            key,
            CacheEntry {
                value,
                stored_at: Instant::now(),
            },
        );
    }

    /// Remove all entries.
    pub fn clear(&self) {
        self.lock().clear();
    }

    /// Number of entries currently stored, expired or not.
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<V> std::fmt::Debug for TtlCache<V> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TtlCache")
            .field("ttl", &self.ttl)
            .field("max_size", &self.max_size)
            .finish()
    }
}

// =============================================================================
// TESTS
// =============================================================================
