//! Outcome record

use crate::core::classifier::FailureKind;
use crate::core::policy::CostTier;
use crate::core::types::{ProviderKind, Usage};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutcomeStatus {
    Success,
    Error,
}

/// One terminal task outcome
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskOutcome {
    pub status: OutcomeStatus,
    pub kind: String,
    pub mode: Option<String>,
    pub latency_ms: u64,
    pub provider: ProviderKind,
    pub model: String,
    pub usage: Option<Usage>,
    pub estimated_cost_usd: Option<f64>,
    pub cost_tier: CostTier,
    pub prompt_chars: usize,
    pub has_context: bool,
    pub metadata: HashMap<String, Value>,
    pub citations_count: usize,
    pub client_id: String,
    /// Provider attempts made, zero for a cache replay
    pub attempts: u32,
    pub cached: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_type: Option<FailureKind>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub retryable: Option<bool>,
}

impl TaskOutcome {
    pub fn is_success(&self) -> bool {
        self.status == OutcomeStatus::Success
    }
}
