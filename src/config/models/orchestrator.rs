//! Orchestrator retry configuration

use super::*;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Attempt, backoff and replay settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrchestratorConfig {
    /// Attempts per task, fallbacks included
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,
    /// Delay before the first retry
    #[serde(default = "default_base_delay_ms")]
    pub base_delay_ms: u64,
    /// Upper bound for any single delay
    #[serde(default = "default_max_delay_ms")]
    pub max_delay_ms: u64,
    #[serde(default = "default_backoff_multiplier")]
    pub backoff_multiplier: f64,
    /// Deadline for one provider attempt
    #[serde(default = "default_timeout")]
    pub attempt_timeout_secs: u64,
    /// Characters per replayed chunk on a cache hit
    #[serde(default = "default_replay_chunk_size")]
    pub replay_chunk_size: usize,
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
            base_delay_ms: default_base_delay_ms(),
            max_delay_ms: default_max_delay_ms(),
            backoff_multiplier: default_backoff_multiplier(),
            attempt_timeout_secs: default_timeout(),
            replay_chunk_size: default_replay_chunk_size(),
        }
    }
}

impl OrchestratorConfig {
    pub fn base_delay(&self) -> Duration {
        Duration::from_millis(self.base_delay_ms)
    }

    pub fn max_delay(&self) -> Duration {
        Duration::from_millis(self.max_delay_ms)
    }

    pub fn attempt_timeout(&self) -> Duration {
        Duration::from_secs(self.attempt_timeout_secs)
    }
}
