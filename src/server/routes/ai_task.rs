//! Streaming AI task endpoint

use crate::core::types::TaskRequest;
use crate::server::state::AppState;
use crate::utils::error::GatewayError;
use crate::utils::generate_request_id;
use actix_web::http::header::{CACHE_CONTROL, CONTENT_TYPE};
use actix_web::{HttpRequest, HttpResponse, Result as ActixResult, web};
use futures::StreamExt;
use tracing::{Instrument, debug, info_span};

/// Header a caller may use to identify itself to the rate limiter
pub const CLIENT_ID_HEADER: &str = "X-Client-Id";
/// Response header carrying the id used in this task's log lines
pub const REQUEST_ID_HEADER: &str = "X-Request-Id";

/// Configure AI task routes
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.route("/ai/task", web::post().to(submit_task));
}

/// Run one AI task and stream its events as SSE
///
/// Admission failures (empty prompt, rate limit) are plain HTTP errors.
/// Once streaming starts every outcome arrives as a terminal `done` or
/// `error` event.
pub async fn submit_task(
    state: web::Data<AppState>,
    req: HttpRequest,
    payload: web::Json<TaskRequest>,
) -> ActixResult<HttpResponse> {
    let request = payload.into_inner();
    let request_id = generate_request_id();
    let span = info_span!("ai_task", request_id = %request_id);
    let transport_id = transport_client_id(&req);

    let events = async move {
        debug!(kind = %request.kind, client = ?transport_id, "AI task requested");
        state
            .orchestrator
            .submit(request, transport_id.as_deref())
            .await
    }
    .instrument(span)
    .await?;

    let body = events.map(|event| Ok::<_, GatewayError>(event.to_sse_bytes()));

    Ok(HttpResponse::Ok()
        .insert_header((CONTENT_TYPE, "text/event-stream"))
        .insert_header((REQUEST_ID_HEADER, request_id))
        .insert_header((CACHE_CONTROL, "no-cache"))
        .insert_header(("X-Accel-Buffering", "no"))
        .streaming(body))
}

/// `X-Client-Id` header, then the peer address
fn transport_client_id(req: &HttpRequest) -> Option<String> {
    req.headers()
        .get(CLIENT_ID_HEADER)
        .and_then(|value| value.to_str().ok())
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(str::to_string)
        .or_else(|| req.connection_info().realip_remote_addr().map(str::to_string))
}
