//! Response cache administration

use crate::server::state::AppState;
use actix_web::{HttpResponse, Result as ActixResult, web};
use serde::{Deserialize, Serialize};
use tracing::info;

/// Configure cache administration routes
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/ai/cache")
            .route("", web::delete().to(clear_cache))
            .route("/stats", web::get().to(cache_stats)),
    );
}

/// Result of clearing the cache
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClearedResponse {
    pub cleared: usize,
}

async fn cache_stats(state: web::Data<AppState>) -> ActixResult<HttpResponse> {
    Ok(HttpResponse::Ok().json(state.orchestrator.cache().stats()))
}

async fn clear_cache(state: web::Data<AppState>) -> ActixResult<HttpResponse> {
    let cleared = state.orchestrator.cache().clear();
    info!(cleared, "Response cache cleared via API");
    Ok(HttpResponse::Ok().json(ClearedResponse { cleared }))
}
