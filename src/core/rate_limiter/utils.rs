//! Utility functions for rate limiter

use super::limiter::SlidingWindowRateLimiter;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;

impl SlidingWindowRateLimiter {
    /// Drop clients with no activity left in either window
    pub async fn cleanup(&self) {
        let now = Instant::now();

        let mut clients = self.clients.write().await;
        clients.retain(|_, usage| {
            usage.prune(now, self.window, Duration::from_secs(3600));
            !usage.is_empty()
        });
    }

    /// Start background cleanup task
    pub fn start_cleanup_task(self: Arc<Self>) {
        let limiter = self.clone();
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(Duration::from_secs(60));
            loop {
                interval.tick().await;
                limiter.cleanup().await;
            }
        });
    }

    /// Number of clients currently tracked
    pub async fn tracked_clients(&self) -> usize {
        self.clients.read().await.len()
    }

    /// Check if rate limiting is enabled
    pub fn is_enabled(&self) -> bool {
        self.config.enabled
    }

    /// Get the configured limit
    pub fn limit(&self) -> u32 {
        self.config.requests_per_minute
    }
}
