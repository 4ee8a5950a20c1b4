//! Rate Limiting Implementation
//!
//! Per-client admission control consulted before a task starts, with spend
//! reported back once the task completes.

mod limiter;
mod types;
mod utils;


pub use limiter::SlidingWindowRateLimiter;
pub use types::RateLimitDecision;

use async_trait::async_trait;

/// Admission control for AI tasks
#[async_trait]
pub trait TaskRateLimiter: Send + Sync {
    /// Decide whether `client_id` may start a task of `kind`, recording the request when allowed
    async fn check(&self, client_id: &str, kind: &str, estimated_cost: f64) -> RateLimitDecision;

    /// Report what a completed task actually cost
    async fn record(&self, client_id: &str, kind: &str, actual_cost: f64);
}

/// Limiter that admits everything
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopRateLimiter;

#[async_trait]
impl TaskRateLimiter for NoopRateLimiter {
    async fn check(&self, _client_id: &str, _kind: &str, _estimated_cost: f64) -> RateLimitDecision {
        RateLimitDecision::allow()
    }

    async fn record(&self, _client_id: &str, _kind: &str, _actual_cost: f64) {}
}
