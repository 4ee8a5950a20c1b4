//! In-process sinks

use super::{OutcomeStatus, TaskOutcome, TelemetrySink};
use parking_lot::Mutex;
use std::sync::Arc;
use tracing::{info, warn};

/// Logs every outcome
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingTelemetrySink;

impl TelemetrySink for TracingTelemetrySink {
    fn record(&self, outcome: TaskOutcome) {
        match outcome.status {
            OutcomeStatus::Success => info!(
                kind = %outcome.kind,
                provider = %outcome.provider,
                model = %outcome.model,
                cost_tier = %outcome.cost_tier,
                latency_ms = outcome.latency_ms,
                total_tokens = outcome.usage.map(|u| u.total_tokens),
                cost_usd = outcome.estimated_cost_usd,
                attempts = outcome.attempts,
                cached = outcome.cached,
                client_id = %outcome.client_id,
                "ai_task completed"
            ),
            OutcomeStatus::Error => warn!(
                kind = %outcome.kind,
                provider = %outcome.provider,
                model = %outcome.model,
                latency_ms = outcome.latency_ms,
                attempts = outcome.attempts,
                error_type = ?outcome.error_type,
                retryable = ?outcome.retryable,
                error = outcome.error.as_deref().unwrap_or(""),
                client_id = %outcome.client_id,
                "ai_task failed"
            ),
        }
    }
}

/// Keeps outcomes in memory
#[derive(Debug, Default)]
pub struct MemoryTelemetrySink {
    outcomes: Mutex<Vec<TaskOutcome>>,
}

impl MemoryTelemetrySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn outcomes(&self) -> Vec<TaskOutcome> {
        self.outcomes.lock().clone()
    }

    pub fn len(&self) -> usize {
        self.outcomes.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.outcomes.lock().is_empty()
    }
}

impl TelemetrySink for MemoryTelemetrySink {
    fn record(&self, outcome: TaskOutcome) {
        self.outcomes.lock().push(outcome);
    }
}

/// Forwards each outcome to several sinks
#[derive(Default, Clone)]
pub struct FanoutTelemetrySink {
    sinks: Vec<Arc<dyn TelemetrySink>>,
}

impl FanoutTelemetrySink {
    pub fn new(sinks: Vec<Arc<dyn TelemetrySink>>) -> Self {
        Self { sinks }
    }

    pub fn push(&mut self, sink: Arc<dyn TelemetrySink>) {
        self.sinks.push(sink);
    }

    pub fn len(&self) -> usize {
        self.sinks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sinks.is_empty()
    }
}

impl TelemetrySink for FanoutTelemetrySink {
    fn record(&self, outcome: TaskOutcome) {
        if let Some((last, rest)) = self.sinks.split_last() {
            for sink in rest {
                sink.record(outcome.clone());
            }
            last.record(outcome);
        }
    }
}

impl std::fmt::Debug for FanoutTelemetrySink {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FanoutTelemetrySink")
            .field("sinks", &self.sinks.len())
            .finish()
    }
}
