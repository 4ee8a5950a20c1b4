//! Test fixtures
//!
//! Builds an orchestrator over scripted OpenAI and Anthropic stand-ins with
//! in-memory telemetry.

use super::providers::ScriptedProvider;
use ai_task_gateway::config::models::GatewayConfig;
use ai_task_gateway::core::orchestrator::{TaskEvent, TaskOrchestrator, TaskStream};
use ai_task_gateway::core::providers::{Provider, ProviderRegistry};
use ai_task_gateway::core::telemetry::MemoryTelemetrySink;
use ai_task_gateway::core::types::ProviderKind;
use futures::StreamExt;
use std::sync::Arc;

/// Gateway configuration with no file output and no rate limiting
pub fn test_config() -> GatewayConfig {
    let mut config = GatewayConfig::default();
    config.telemetry.enabled = false;
    config.rate_limit.enabled = false;
    config
}

/// Orchestrator wired to scripted providers
pub struct TestGateway {
    pub orchestrator: TaskOrchestrator,
    pub telemetry: Arc<MemoryTelemetrySink>,
    pub openai: Arc<ScriptedProvider>,
    pub anthropic: Arc<ScriptedProvider>,
}

impl TestGateway {
    pub fn new(openai: ScriptedProvider, anthropic: ScriptedProvider) -> Self {
        Self::with_config(openai, anthropic, &test_config())
    }

    pub fn with_config(
        openai: ScriptedProvider,
        anthropic: ScriptedProvider,
        config: &GatewayConfig,
    ) -> Self {
        let openai = Arc::new(openai);
        let anthropic = Arc::new(anthropic);

        let mut registry = ProviderRegistry::new();
        registry.register(Provider::custom(ProviderKind::OpenAI, openai.clone()));
        registry.register(Provider::custom(ProviderKind::Anthropic, anthropic.clone()));

        let telemetry = Arc::new(MemoryTelemetrySink::new());
        let orchestrator =
            TaskOrchestrator::new(Arc::new(registry), config).with_telemetry(telemetry.clone());

        Self {
            orchestrator,
            telemetry,
            openai,
            anthropic,
        }
    }

    /// Total provider calls across both stand-ins
    pub fn provider_calls(&self) -> usize {
        self.openai.calls() + self.anthropic.calls()
    }
}

/// Drain a task stream
pub async fn collect_events(mut stream: TaskStream) -> Vec<TaskEvent> {
    let mut events = Vec::new();
    while let Some(event) = stream.next().await {
        events.push(event);
    }
    events
}

/// The last event, asserting that it is the only terminal one
pub fn terminal_event(events: &[TaskEvent]) -> &TaskEvent {
    let terminals = events.iter().filter(|e| e.is_terminal()).count();
    assert_eq!(terminals, 1, "expected exactly one terminal event: {:?}", events);
    let last = events.last().expect("stream produced no events");
    assert!(last.is_terminal(), "terminal event must come last: {:?}", events);
    last
}

/// Concatenated delta text
pub fn delta_text(events: &[TaskEvent]) -> String {
    events
        .iter()
        .filter_map(|e| match e {
            TaskEvent::Delta(text) => Some(text.as_str()),
            _ => None,
        })
        .collect()
}
