//! Response cache implementation

use super::key::CacheKey;
use super::types::{CacheEntry, CacheStats};
use crate::core::types::CachedResponse;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::time::Duration;
use tracing::{debug, info};

/// Shared TTL cache of completed responses
///
/// Every mutation happens under a single write lock, so readers never see a
/// partially written entry and eviction bookkeeping stays consistent.
#[derive(Debug)]
pub struct ResponseCache {
    entries: RwLock<HashMap<CacheKey, CacheEntry>>,
    max_entries: usize,
}

impl ResponseCache {
    /// Create a cache holding at most `max_entries` responses
    pub fn new(max_entries: usize) -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            max_entries: max_entries.max(1),
        }
    }

    /// Get a cached response no older than `max_age`
    ///
    /// An entry older than `max_age` is removed and reported as a miss.
    pub fn get(&self, key: &CacheKey, max_age: Duration) -> Option<CachedResponse> {
        {
            let entries = self.entries.read();
            let entry = entries.get(key)?;
            let age = entry.age();
            if age <= max_age {
                debug!(key = %key, age_secs = age.as_secs(), "Cache hit");
                return Some(entry.response.clone());
            }
        }

        let mut entries = self.entries.write();
        // Re-check under the write lock; a concurrent put may have refreshed it
        match entries.get(key) {
            Some(entry) if entry.age() > max_age => {
                debug!(key = %key, age_secs = entry.age().as_secs(), "Cache entry expired");
                entries.remove(key);
                None
            }
            Some(entry) => Some(entry.response.clone()),
            None => None,
        }
    }

    /// Store a response
    ///
    /// Empty responses are never stored; returns whether the entry was written.
    /// When a new key would exceed capacity, the oldest insertion is evicted
    /// first. Writing an existing key replaces it (last writer wins).
    pub fn put(&self, key: CacheKey, response: CachedResponse, ttl: Duration) -> bool {
        if response.text.trim().is_empty() {
            debug!(key = %key, "Refusing to cache empty response");
            return false;
        }

        let mut entries = self.entries.write();
        if !entries.contains_key(&key) && entries.len() >= self.max_entries {
            let oldest = entries
                .iter()
                .min_by_key(|(_, entry)| entry.inserted_at)
                .map(|(k, _)| k.clone());
            if let Some(oldest) = oldest {
                entries.remove(&oldest);
                debug!(key = %oldest, "Evicted oldest cache entry");
            }
        }

        debug!(key = %key, ttl_secs = ttl.as_secs(), "Cached response");
        entries.insert(key, CacheEntry::new(response, ttl));
        true
    }

    /// Remove every entry, returning how many were removed
    pub fn clear(&self) -> usize {
        let mut entries = self.entries.write();
        let count = entries.len();
        entries.clear();
        info!(cleared = count, "Response cache cleared");
        count
    }

    /// Snapshot of cache occupancy; expiry is judged against each entry's own TTL
    pub fn stats(&self) -> CacheStats {
        let entries = self.entries.read();
        let expired = entries.values().filter(|e| e.is_expired()).count();
        CacheStats {
            total_entries: entries.len(),
            valid_entries: entries.len() - expired,
            expired_entries: expired,
            max_entries: self.max_entries,
        }
    }

    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }

    pub fn max_entries(&self) -> usize {
        self.max_entries
    }
}
