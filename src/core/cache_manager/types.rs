//! Cache entry and statistics types

use crate::core::types::CachedResponse;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tokio::time::Instant;

/// Cache entry with insertion metadata
#[derive(Debug, Clone)]
pub struct CacheEntry {
    /// The cached payload
    pub response: CachedResponse,
    /// When the entry was inserted; never refreshed on read
    pub inserted_at: Instant,
    /// TTL the entry was written with
    pub ttl: Duration,
}

impl CacheEntry {
    /// Create a new cache entry
    pub fn new(response: CachedResponse, ttl: Duration) -> Self {
        Self {
            response,
            inserted_at: Instant::now(),
            ttl,
        }
    }

    /// Get the age of the entry
    pub fn age(&self) -> Duration {
        Instant::now().saturating_duration_since(self.inserted_at)
    }

    /// Check the entry against its own TTL
    pub fn is_expired(&self) -> bool {
        self.age() > self.ttl
    }
}

/// Cache statistics snapshot
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheStats {
    pub total_entries: usize,
    pub valid_entries: usize,
    pub expired_entries: usize,
    pub max_entries: usize,
}
