//! Rate limiting configuration

use super::*;
use serde::{Deserialize, Serialize};

/// Per-client rate limiting configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RateLimitConfig {
    /// Enable rate limiting
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Requests allowed per client per minute
    #[serde(default = "default_rpm")]
    pub requests_per_minute: u32,
    /// Optional per-client spend ceiling per hour, in USD
    #[serde(default)]
    pub hourly_cost_budget_usd: Option<f64>,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            requests_per_minute: default_rpm(),
            hourly_cost_budget_usd: None,
        }
    }
}
