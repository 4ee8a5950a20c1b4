//! Retry and backoff decisions

use crate::config::models::orchestrator::OrchestratorConfig;
use std::time::Duration;

/// Attempt ceiling and backoff curve
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RetrySettings {
    pub max_attempts: u32,
    pub base_delay: Duration,
    pub max_delay: Duration,
    pub multiplier: f64,
}

impl Default for RetrySettings {
    fn default() -> Self {
        Self::from(&OrchestratorConfig::default())
    }
}

impl From<&OrchestratorConfig> for RetrySettings {
    fn from(config: &OrchestratorConfig) -> Self {
        Self {
            max_attempts: config.max_attempts.max(1),
            base_delay: config.base_delay(),
            max_delay: config.max_delay(),
            multiplier: config.backoff_multiplier,
        }
    }
}

/// What to do after attempt `n` failed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NextStep {
    /// Same spec again after the delay
    Retry(Duration),
    /// Ask the policy for an alternate spec, no delay
    Fallback,
    GiveUp,
}

impl RetrySettings {
    /// Delay before the attempt following attempt `attempt` (1-based)
    ///
    /// `min(base * multiplier^(attempt-1), max_delay)`
    pub fn backoff_delay(&self, attempt: u32) -> Duration {
        let exponent = attempt.saturating_sub(1).min(i32::MAX as u32) as i32;
        let secs = self.base_delay.as_secs_f64() * self.multiplier.powi(exponent);
        let cap = self.max_delay.as_secs_f64();
        if !secs.is_finite() || secs >= cap {
            self.max_delay
        } else {
            Duration::from_secs_f64(secs.max(0.0))
        }
    }

    /// Decide the transition out of a failed attempt
    pub fn next_step(&self, retryable: bool, attempt: u32) -> NextStep {
        if attempt >= self.max_attempts {
            NextStep::GiveUp
        } else if retryable {
            NextStep::Retry(self.backoff_delay(attempt))
        } else {
            NextStep::Fallback
        }
    }
}
