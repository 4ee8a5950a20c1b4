//! Rate limiter that admits everything and remembers what it was told

use ai_task_gateway::core::rate_limiter::{RateLimitDecision, TaskRateLimiter};
use async_trait::async_trait;
use parking_lot::Mutex;

/// One call seen by [`RecordingRateLimiter`]
#[derive(Debug, Clone, PartialEq)]
pub struct LimiterCall {
    pub client_id: String,
    pub kind: String,
    pub cost: f64,
}

#[derive(Debug, Default)]
pub struct RecordingRateLimiter {
    checks: Mutex<Vec<LimiterCall>>,
    records: Mutex<Vec<LimiterCall>>,
}

impl RecordingRateLimiter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Admission checks with their pre-flight estimates
    pub fn checks(&self) -> Vec<LimiterCall> {
        self.checks.lock().clone()
    }

    /// Spend reported after completed tasks
    pub fn records(&self) -> Vec<LimiterCall> {
        self.records.lock().clone()
    }
}

#[async_trait]
impl TaskRateLimiter for RecordingRateLimiter {
    async fn check(&self, client_id: &str, kind: &str, estimated_cost: f64) -> RateLimitDecision {
        self.checks.lock().push(LimiterCall {
            client_id: client_id.to_string(),
            kind: kind.to_string(),
            cost: estimated_cost,
        });
        RateLimitDecision::allow()
    }

    async fn record(&self, client_id: &str, kind: &str, actual_cost: f64) {
        self.records.lock().push(LimiterCall {
            client_id: client_id.to_string(),
            kind: kind.to_string(),
            cost: actual_cost,
        });
    }
}
