//! Application state shared across HTTP handlers

use crate::config::Config;
use crate::core::orchestrator::TaskOrchestrator;
use crate::core::providers::ProviderRegistry;
use crate::core::rate_limiter::SlidingWindowRateLimiter;
use crate::core::telemetry::{
    FanoutTelemetrySink, JsonlTelemetrySink, MetricsStore, TelemetrySink, TracingTelemetrySink,
};
use crate::utils::error::Result;
use std::sync::Arc;
use tracing::{debug, info};

/// HTTP server state shared across handlers
///
/// Cloned into every actix worker; all fields are shared handles.
#[derive(Clone)]
pub struct AppState {
    /// Gateway configuration (shared read-only)
    pub config: Arc<Config>,
    /// Task orchestrator, owning the response cache and provider registry
    pub orchestrator: TaskOrchestrator,
    /// Recent outcomes behind `/ai/metrics`
    pub metrics: Arc<MetricsStore>,
}

impl AppState {
    /// Wrap an already assembled orchestrator
    ///
    /// The metrics store starts empty; use [`AppState::with_metrics`] to share
    /// the store the orchestrator's telemetry feeds.
    pub fn new(config: Config, orchestrator: TaskOrchestrator) -> Self {
        let metrics = Arc::new(MetricsStore::new(config.gateway.telemetry.metrics_capacity));
        Self {
            config: Arc::new(config),
            orchestrator,
            metrics,
        }
    }

    pub fn with_metrics(mut self, metrics: Arc<MetricsStore>) -> Self {
        self.metrics = metrics;
        self
    }

    /// Build providers, limiter and telemetry sinks from configuration
    ///
    /// Must be called inside a Tokio runtime: the JSONL sink and the limiter
    /// cleanup run as background tasks.
    pub fn from_config(config: Config) -> Result<Self> {
        let gateway = &config.gateway;

        let registry = ProviderRegistry::from_configs(&gateway.providers)?;
        info!(providers = ?registry.list(), "Provider registry ready");

        let limiter = Arc::new(SlidingWindowRateLimiter::new(gateway.rate_limit.clone()));
        if limiter.is_enabled() {
            limiter.clone().start_cleanup_task();
        }

        let metrics = Arc::new(MetricsStore::new(gateway.telemetry.metrics_capacity));
        let orchestrator = TaskOrchestrator::new(Arc::new(registry), gateway)
            .with_rate_limiter(limiter)
            .with_telemetry(build_telemetry(&config, metrics.clone()));

        Ok(Self::new(config, orchestrator).with_metrics(metrics))
    }

    /// Get gateway configuration
    pub fn config(&self) -> &Config {
        &self.config
    }
}

fn build_telemetry(config: &Config, metrics: Arc<MetricsStore>) -> Arc<dyn TelemetrySink> {
    let telemetry = &config.gateway.telemetry;
    let mut fanout = FanoutTelemetrySink::default();

    if telemetry.enabled {
        debug!(path = %telemetry.metrics_path, "Writing task outcomes as JSONL");
        fanout.push(Arc::new(JsonlTelemetrySink::new(&telemetry.metrics_path)));
    }
    if telemetry.log_outcomes || fanout.is_empty() {
        fanout.push(Arc::new(TracingTelemetrySink));
    }
    fanout.push(metrics);

    Arc::new(fanout)
}
