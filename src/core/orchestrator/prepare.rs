//! Request preparation ahead of the attempt loop

use crate::core::cache_manager::CacheKey;
use crate::core::policy::CostTier;
use crate::core::telemetry::{OutcomeStatus, TaskOutcome};
use crate::core::types::{ChatMessage, Citation, ModelSpec, ProviderKind, TaskRequest, Usage};
use serde_json::Value;
use std::collections::{BTreeSet, HashMap};
use std::time::Duration;
use tokio::time::Instant;

/// Identity used for rate limiting and telemetry
///
/// `metadata.client_id`, then `metadata.user_id`, then the transport-level
/// identity (header or peer address), then `anonymous`.
pub fn resolve_client_id(request: &TaskRequest, transport_id: Option<&str>) -> String {
    request
        .metadata_str("client_id")
        .or_else(|| request.metadata_str("user_id"))
        .or_else(|| transport_id.map(str::trim).filter(|s| !s.is_empty()))
        .unwrap_or("anonymous")
        .to_string()
}

/// Where a cacheable task is looked up and stored
#[derive(Debug, Clone)]
pub(super) struct CacheSlot {
    pub key: CacheKey,
    pub ttl: Duration,
}

/// Everything the attempt loop needs, fixed before the first attempt
#[derive(Debug)]
pub(super) struct PreparedTask {
    pub kind: String,
    pub mode: Option<String>,
    pub prompt: String,
    pub metadata: HashMap<String, Value>,
    pub has_context: bool,
    /// Whether the context builder produced text; selects the budget branch
    pub enhanced_context: bool,
    pub requested_max_tokens: Option<u32>,
    pub requested_temperature: Option<f32>,
    pub client_id: String,
    pub cost_tier: CostTier,
    pub available: BTreeSet<ProviderKind>,
    /// Policy choice before caller overrides and the token budget
    pub base: ModelSpec,
    pub primary: ModelSpec,
    pub messages: Vec<ChatMessage>,
    pub citations: Vec<Citation>,
    pub cache: Option<CacheSlot>,
    pub started: Instant,
}

impl PreparedTask {
    pub fn elapsed_ms(&self) -> u64 {
        self.started.elapsed().as_millis() as u64
    }

    /// Telemetry record with the fields every outcome shares
    pub fn outcome(&self, status: OutcomeStatus, spec: &ModelSpec, attempts: u32) -> TaskOutcome {
        TaskOutcome {
            status,
            kind: self.kind.clone(),
            mode: self.mode.clone(),
            latency_ms: self.elapsed_ms(),
            provider: spec.provider,
            model: spec.model.clone(),
            usage: None,
            estimated_cost_usd: None,
            cost_tier: self.cost_tier,
            prompt_chars: self.prompt.chars().count(),
            has_context: self.has_context,
            metadata: self.metadata.clone(),
            citations_count: self.citations.len(),
            client_id: self.client_id.clone(),
            attempts,
            cached: false,
            error: None,
            error_type: None,
            retryable: None,
        }
    }

    pub fn success_outcome(
        &self,
        spec: &ModelSpec,
        attempts: u32,
        usage: Option<Usage>,
        cost: Option<f64>,
    ) -> TaskOutcome {
        TaskOutcome {
            usage,
            estimated_cost_usd: cost,
            ..self.outcome(OutcomeStatus::Success, spec, attempts)
        }
    }
}
