//! Task outcome metrics
//!
//! Aggregates over the in-memory [`MetricsStore`](crate::core::telemetry::MetricsStore):
//! a summary by kind and model, a bucketed timeline, and the most frequent errors.

use crate::core::telemetry::MetricsFilter;
use crate::core::telemetry::metrics::MAX_WINDOW_HOURS;
use crate::server::state::AppState;
use crate::utils::error::{GatewayError, Result};
use actix_web::{HttpResponse, Result as ActixResult, web};
use serde::Deserialize;

const DEFAULT_HOURS: u32 = 24;
const DEFAULT_INTERVAL_MINUTES: u32 = 60;
const DEFAULT_ERROR_LIMIT: usize = 10;

/// Configure metrics routes
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/ai/metrics")
            .route("/summary", web::get().to(summary))
            .route("/timeline", web::get().to(timeline))
            .route("/top-errors", web::get().to(top_errors)),
    );
}

fn default_hours() -> u32 {
    DEFAULT_HOURS
}

fn default_interval() -> u32 {
    DEFAULT_INTERVAL_MINUTES
}

fn default_limit() -> usize {
    DEFAULT_ERROR_LIMIT
}

#[derive(Debug, Deserialize)]
pub struct SummaryQuery {
    #[serde(default = "default_hours")]
    pub hours: u32,
    pub kind: Option<String>,
    pub mode: Option<String>,
    pub client_id: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct TimelineQuery {
    #[serde(default = "default_hours")]
    pub hours: u32,
    #[serde(default = "default_interval")]
    pub interval_minutes: u32,
    pub kind: Option<String>,
    pub mode: Option<String>,
    pub client_id: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct TopErrorsQuery {
    #[serde(default = "default_hours")]
    pub hours: u32,
    #[serde(default = "default_limit")]
    pub limit: usize,
}

fn check_range<T>(name: &str, value: T, min: T, max: T) -> Result<()>
where
    T: PartialOrd + std::fmt::Display + Copy,
{
    if value < min || value > max {
        return Err(GatewayError::validation(format!(
            "{} must be between {} and {}",
            name, min, max
        )));
    }
    Ok(())
}

async fn summary(
    state: web::Data<AppState>,
    query: web::Query<SummaryQuery>,
) -> ActixResult<HttpResponse> {
    let query = query.into_inner();
    check_range("hours", query.hours, 1, MAX_WINDOW_HOURS)?;

    let filter = MetricsFilter {
        kind: query.kind,
        mode: query.mode,
        client_id: query.client_id,
    };
    Ok(HttpResponse::Ok().json(state.metrics.summary(query.hours, &filter)))
}

async fn timeline(
    state: web::Data<AppState>,
    query: web::Query<TimelineQuery>,
) -> ActixResult<HttpResponse> {
    let query = query.into_inner();
    check_range("hours", query.hours, 1, MAX_WINDOW_HOURS)?;
    check_range("interval_minutes", query.interval_minutes, 5, 1440)?;

    let filter = MetricsFilter {
        kind: query.kind,
        mode: query.mode,
        client_id: query.client_id,
    };
    Ok(HttpResponse::Ok().json(state.metrics.timeline(
        query.hours,
        query.interval_minutes,
        &filter,
    )))
}

async fn top_errors(
    state: web::Data<AppState>,
    query: web::Query<TopErrorsQuery>,
) -> ActixResult<HttpResponse> {
    let query = query.into_inner();
    check_range("hours", query.hours, 1, MAX_WINDOW_HOURS)?;
    check_range("limit", query.limit, 1, 50)?;

    Ok(HttpResponse::Ok().json(state.metrics.top_errors(query.hours, query.limit)))
}
