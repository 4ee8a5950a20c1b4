//! Server builder and run_server function

use crate::config::Config;
use crate::core::context::CitationSource;
use crate::server::server::HttpServer;
use crate::server::state::AppState;
use crate::utils::error::{GatewayError, Result};
use std::sync::Arc;
use tracing::info;

/// Server builder for embedding the gateway with custom collaborators
#[derive(Default)]
pub struct ServerBuilder {
    config: Option<Config>,
    citation_source: Option<Arc<dyn CitationSource>>,
}

impl ServerBuilder {
    /// Create a new server builder
    pub fn new() -> Self {
        Self::default()
    }

    /// Set configuration
    pub fn with_config(mut self, config: Config) -> Self {
        self.config = Some(config);
        self
    }

    /// Supply search citations for `search` tasks
    pub fn with_citation_source(mut self, source: Arc<dyn CitationSource>) -> Self {
        self.citation_source = Some(source);
        self
    }

    /// Build the HTTP server
    pub fn build(self) -> Result<HttpServer> {
        let config = self
            .config
            .ok_or_else(|| GatewayError::config("Configuration is required"))?;

        let mut state = AppState::from_config(config)?;
        if let Some(source) = self.citation_source {
            state.orchestrator = state.orchestrator.with_citation_source(source);
        }
        Ok(HttpServer::with_state(state))
    }
}

/// Run the server with a loaded configuration
pub async fn run_server(config: Config) -> Result<()> {
    let server = ServerBuilder::new().with_config(config).build()?;
    let address = server.config().address();

    info!("Server starting at: http://{}", address);
    info!("API Endpoints:");
    info!("   GET    /health                - Health check");
    info!("   POST   /ai/task               - Streaming AI task (SSE)");
    info!("   GET    /ai/cache/stats        - Response cache statistics");
    info!("   DELETE /ai/cache              - Clear response cache");
    info!("   GET    /ai/metrics/summary    - Outcome totals by kind and model");
    info!("   GET    /ai/metrics/timeline   - Outcomes per time bucket");
    info!("   GET    /ai/metrics/top-errors - Most frequent failures");

    server.start().await
}
