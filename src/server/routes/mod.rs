//! HTTP route modules

pub mod ai_task;
pub mod cache;
pub mod health;
pub mod metrics;

use actix_web::web;

/// Mount every gateway route
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.configure(health::configure_routes)
        .configure(ai_task::configure_routes)
        .configure(cache::configure_routes)
        .configure(metrics::configure_routes);
}
