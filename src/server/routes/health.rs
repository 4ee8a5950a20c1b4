//! Health check endpoint

use crate::core::types::ProviderKind;
use crate::server::state::AppState;
use actix_web::{HttpResponse, Result as ActixResult, web};
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use tracing::debug;

/// Configure health check routes
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.route("/health", web::get().to(health_check));
}

/// Health check response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthStatus {
    pub status: Cow<'static, str>,
    pub timestamp: chrono::DateTime<chrono::Utc>,
    pub version: Cow<'static, str>,
    /// Providers that currently accept requests
    pub providers: Vec<ProviderKind>,
    pub cache_entries: usize,
}

/// Basic health check endpoint
///
/// Reports `degraded` when no provider is available; the gateway still
/// answers cached requests in that state.
pub async fn health_check(state: web::Data<AppState>) -> ActixResult<HttpResponse> {
    debug!("Health check requested");

    let providers: Vec<ProviderKind> = state
        .orchestrator
        .registry()
        .available()
        .await
        .into_iter()
        .collect();

    let status = HealthStatus {
        status: if providers.is_empty() {
            Cow::Borrowed("degraded")
        } else {
            Cow::Borrowed("healthy")
        },
        timestamp: chrono::Utc::now(),
        version: Cow::Borrowed(env!("CARGO_PKG_VERSION")),
        providers,
        cache_entries: state.orchestrator.cache().len(),
    };

    Ok(HttpResponse::Ok().json(status))
}
