//! Telemetry configuration

use super::*;
use serde::{Deserialize, Serialize};

/// Task outcome telemetry configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TelemetryConfig {
    /// Append outcomes to a JSONL file
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// JSONL destination
    #[serde(default = "default_metrics_path")]
    pub metrics_path: String,
    /// Also log every outcome through tracing
    #[serde(default)]
    pub log_outcomes: bool,
    /// Recent outcomes kept in memory for the metrics endpoints
    #[serde(default = "default_metrics_capacity")]
    pub metrics_capacity: usize,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            metrics_path: default_metrics_path(),
            log_outcomes: false,
            metrics_capacity: default_metrics_capacity(),
        }
    }
}
