//! Sliding window rate limiter with an optional hourly cost budget

use super::TaskRateLimiter;
use super::types::{ClientUsage, RateLimitDecision};
use crate::config::models::rate_limit::RateLimitConfig;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use tokio::time::Instant;
use tracing::{debug, warn};

const BUDGET_WINDOW: Duration = Duration::from_secs(3600);

/// Rate limiter implementation
pub struct SlidingWindowRateLimiter {
    pub(super) config: RateLimitConfig,
    /// Usage by client id
    pub(super) clients: Arc<RwLock<HashMap<String, ClientUsage>>>,
    /// Request window duration
    pub(super) window: Duration,
}

impl SlidingWindowRateLimiter {
    /// Create a new rate limiter
    pub fn new(config: RateLimitConfig) -> Self {
        Self::with_window(config, Duration::from_secs(60))
    }

    /// Create a rate limiter with custom window
    pub fn with_window(config: RateLimitConfig, window: Duration) -> Self {
        Self {
            config,
            clients: Arc::new(RwLock::new(HashMap::new())),
            window,
        }
    }

    fn seconds_until_free(&self, now: Instant, oldest: Option<Instant>, window: Duration) -> u64 {
        match oldest {
            Some(oldest) => window.saturating_sub(now.duration_since(oldest)).as_secs(),
            None => window.as_secs(),
        }
    }
}

#[async_trait]
impl TaskRateLimiter for SlidingWindowRateLimiter {
    async fn check(&self, client_id: &str, kind: &str, estimated_cost: f64) -> RateLimitDecision {
        if !self.config.enabled {
            return RateLimitDecision::allow();
        }

        let now = Instant::now();
        let limit = self.config.requests_per_minute;

        // Check and record under one lock
        let mut clients = self.clients.write().await;
        let usage = clients.entry(client_id.to_string()).or_default();
        usage.prune(now, self.window, BUDGET_WINDOW);

        if usage.requests.len() as u32 >= limit {
            let retry_after = self.seconds_until_free(now, usage.requests.first().copied(), self.window);
            warn!(client_id, kind, limit, "Rate limit exceeded");
            return RateLimitDecision::deny(
                format!("Rate limit exceeded: {} requests per minute", limit),
                retry_after,
            );
        }

        if let Some(budget) = self.config.hourly_cost_budget_usd {
            let spent = usage.spent();
            if spent + estimated_cost.max(0.0) > budget {
                let retry_after = self.seconds_until_free(
                    now,
                    usage.spend.first().map(|(t, _)| *t),
                    BUDGET_WINDOW,
                );
                warn!(client_id, kind, spent, budget, "Cost budget exceeded");
                return RateLimitDecision::deny(
                    format!(
                        "Cost budget exceeded: ${:.4} of ${:.2} used this hour",
                        spent, budget
                    ),
                    retry_after,
                );
            }
        }

        usage.requests.push(now);
        debug!(client_id, kind, count = usage.requests.len(), "Request admitted");
        RateLimitDecision::allow()
    }

    async fn record(&self, client_id: &str, kind: &str, actual_cost: f64) {
        if !self.config.enabled || actual_cost <= 0.0 {
            return;
        }

        let mut clients = self.clients.write().await;
        let usage = clients.entry(client_id.to_string()).or_default();
        usage.spend.push((Instant::now(), actual_cost));
        debug!(client_id, kind, actual_cost, "Recorded task cost");
    }
}

impl Clone for SlidingWindowRateLimiter {
    fn clone(&self) -> Self {
        Self {
            config: self.config.clone(),
            clients: self.clients.clone(),
            window: self.window,
        }
    }
}

impl std::fmt::Debug for SlidingWindowRateLimiter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SlidingWindowRateLimiter")
            .field("config", &self.config)
            .field("window", &self.window)
            .finish()
    }
}
