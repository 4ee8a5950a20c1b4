//! Rate limiter types and data structures

use serde::Serialize;
use tokio::time::Instant;

/// Outcome of an admission check
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RateLimitDecision {
    /// Whether the request is allowed
    pub allowed: bool,
    /// Human readable denial reason
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    /// Retry after (in seconds, only set when not allowed)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub retry_after_secs: Option<u64>,
}

impl RateLimitDecision {
    pub fn allow() -> Self {
        Self {
            allowed: true,
            reason: None,
            retry_after_secs: None,
        }
    }

    pub fn deny(reason: impl Into<String>, retry_after_secs: u64) -> Self {
        Self {
            allowed: false,
            reason: Some(reason.into()),
            retry_after_secs: Some(retry_after_secs.max(1)),
        }
    }
}

/// Per-client usage history
#[derive(Debug, Clone, Default)]
pub(super) struct ClientUsage {
    /// Request timestamps for the sliding window
    pub(super) requests: Vec<Instant>,
    /// Completed task costs for the hourly budget
    pub(super) spend: Vec<(Instant, f64)>,
}

impl ClientUsage {
    pub(super) fn prune(&mut self, now: Instant, window: std::time::Duration, budget_window: std::time::Duration) {
        self.requests.retain(|&t| now.duration_since(t) < window);
        self.spend.retain(|&(t, _)| now.duration_since(t) < budget_window);
    }

    pub(super) fn spent(&self) -> f64 {
        self.spend.iter().map(|(_, cost)| cost).sum()
    }

    pub(super) fn is_empty(&self) -> bool {
        self.requests.is_empty() && self.spend.is_empty()
    }
}
