//! HTTP surface tests

#[cfg(test)]
mod tests {
    use crate::common::{ScriptedProvider, Step, TestGateway, test_config};
    use ai_task_gateway::config::Config;
    use ai_task_gateway::config::models::GatewayConfig;
    use ai_task_gateway::core::cache_manager::CacheStats;
    use ai_task_gateway::core::telemetry::metrics::{MetricsSummary, MetricsTimeline, TopErrors};
    use ai_task_gateway::core::telemetry::{FanoutTelemetrySink, MetricsStore, TelemetrySink};
    use ai_task_gateway::server::routes::ai_task::{CLIENT_ID_HEADER, REQUEST_ID_HEADER};
    use ai_task_gateway::server::routes::cache::ClearedResponse;
    use ai_task_gateway::server::routes::health::HealthStatus;
    use ai_task_gateway::server::{AppState, HttpServer};
    use actix_web::http::StatusCode;
    use actix_web::{test, web};
    use serde_json::{Value, json};
    use std::sync::Arc;

    fn state(gateway: &TestGateway, config: GatewayConfig) -> web::Data<AppState> {
        web::Data::new(AppState::new(
            Config { gateway: config },
            gateway.orchestrator.clone(),
        ))
    }

    fn default_gateway() -> TestGateway {
        TestGateway::new(
            ScriptedProvider::replying("Markets rallied today."),
            ScriptedProvider::replying("unused"),
        )
    }

    fn task_body(kind: &str, prompt: &str) -> Value {
        json!({ "kind": kind, "prompt": prompt })
    }

    #[actix_web::test]
    async fn test_task_streams_sse_events() {
        let gateway = default_gateway();
        let app = test::init_service(HttpServer::create_app(state(&gateway, test_config()))).await;

        let req = test::TestRequest::post()
            .uri("/ai/task")
            .set_json(task_body("search", "Summarize the news today"))
            .to_request();
        let resp = test::call_service(&app, req).await;

        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(
            resp.headers().get("content-type").unwrap(),
            "text/event-stream"
        );
        assert!(resp.headers().contains_key(REQUEST_ID_HEADER));

        let body = test::read_body(resp).await;
        let body = String::from_utf8(body.to_vec()).unwrap();
        assert!(body.starts_with("data: "));
        assert_eq!(body.matches("event: done\n").count(), 1);
        assert!(!body.contains("event: error"));

        let done_line = body
            .lines()
            .skip_while(|line| *line != "event: done")
            .nth(1)
            .unwrap();
        let payload: Value = serde_json::from_str(done_line.trim_start_matches("data: ")).unwrap();
        assert_eq!(payload["text"], "Markets rallied today.");
        assert_eq!(payload["cached"], false);
        assert_eq!(payload["provider"], "openai");
    }

    #[actix_web::test]
    async fn test_exhausted_task_ends_with_error_event() {
        let gateway = TestGateway::new(
            ScriptedProvider::with_default(vec![Step::error("invalid_api_key", Some(401))]),
            ScriptedProvider::with_default(vec![Step::error("invalid x-api-key", Some(401))]),
        );
        let app = test::init_service(HttpServer::create_app(state(&gateway, test_config()))).await;

        let req = test::TestRequest::post()
            .uri("/ai/task")
            .set_json(task_body("chat", "Explain borrow checking briefly"))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);

        let body = test::read_body(resp).await;
        let body = String::from_utf8(body.to_vec()).unwrap();
        assert!(body.starts_with("event: error\ndata: "));
        let payload: Value =
            serde_json::from_str(body.lines().nth(1).unwrap().trim_start_matches("data: ")).unwrap();
        assert_eq!(payload["retryable"], false);
        assert_eq!(payload["type"], "authentication");
        assert!(!payload["message"].as_str().unwrap().contains("invalid_api_key"));
    }

    #[actix_web::test]
    async fn test_empty_prompt_is_bad_request() {
        let gateway = default_gateway();
        let app = test::init_service(HttpServer::create_app(state(&gateway, test_config()))).await;

        let req = test::TestRequest::post()
            .uri("/ai/task")
            .set_json(task_body("search", ""))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
        assert_eq!(gateway.provider_calls(), 0);
    }

    #[actix_web::test]
    async fn test_rate_limited_client_gets_429() {
        let mut config = test_config();
        config.rate_limit.enabled = true;
        config.rate_limit.requests_per_minute = 1;
        let gateway = TestGateway::with_config(
            ScriptedProvider::replying("Fine"),
            ScriptedProvider::replying("unused"),
            &config,
        );
        let app = test::init_service(HttpServer::create_app(state(&gateway, config))).await;

        for expected in [StatusCode::OK, StatusCode::TOO_MANY_REQUESTS] {
            let req = test::TestRequest::post()
                .uri("/ai/task")
                .insert_header((CLIENT_ID_HEADER, "tenant-9"))
                .set_json(task_body("chat", "Explain borrow checking briefly"))
                .to_request();
            let resp = test::call_service(&app, req).await;
            assert_eq!(resp.status(), expected);
            let _ = test::read_body(resp).await;
        }
        assert_eq!(gateway.openai.calls(), 1);
    }

    #[actix_web::test]
    async fn test_cache_stats_and_clear() {
        let gateway = default_gateway();
        let app = test::init_service(HttpServer::create_app(state(&gateway, test_config()))).await;

        let req = test::TestRequest::post()
            .uri("/ai/task")
            .set_json(task_body("search", "Summarize the news today"))
            .to_request();
        let _ = test::read_body(test::call_service(&app, req).await).await;

        let req = test::TestRequest::get().uri("/ai/cache/stats").to_request();
        let stats: CacheStats = test::call_and_read_body_json(&app, req).await;
        assert_eq!(stats.total_entries, 1);
        assert_eq!(stats.valid_entries, 1);
        assert_eq!(stats.max_entries, 1000);

        let req = test::TestRequest::delete().uri("/ai/cache").to_request();
        let cleared: ClearedResponse = test::call_and_read_body_json(&app, req).await;
        assert_eq!(cleared, ClearedResponse { cleared: 1 });
        assert!(gateway.orchestrator.cache().is_empty());
    }

    #[actix_web::test]
    async fn test_health_lists_available_providers() {
        let gateway = default_gateway();
        gateway.anthropic.set_available(false);
        let app = test::init_service(HttpServer::create_app(state(&gateway, test_config()))).await;

        let req = test::TestRequest::get().uri("/health").to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(resp.headers().get("server").unwrap(), "ai-task-gateway");

        let health: HealthStatus = test::read_body_json(resp).await;
        assert_eq!(health.status, "healthy");
        assert_eq!(
            health.providers,
            vec![ai_task_gateway::ProviderKind::OpenAI]
        );
    }

    #[actix_web::test]
    async fn test_metrics_aggregate_completed_tasks() {
        let gateway = default_gateway();
        let metrics = Arc::new(MetricsStore::new(100));
        let sinks: Vec<Arc<dyn TelemetrySink>> = vec![
            gateway.telemetry.clone() as Arc<dyn TelemetrySink>,
            metrics.clone() as Arc<dyn TelemetrySink>,
        ];
        let orchestrator = gateway
            .orchestrator
            .clone()
            .with_telemetry(Arc::new(FanoutTelemetrySink::new(sinks)));
        let state = web::Data::new(
            AppState::new(Config { gateway: test_config() }, orchestrator).with_metrics(metrics),
        );
        let app = test::init_service(HttpServer::create_app(state)).await;

        for (kind, prompt) in [
            ("search", "Summarize the news today"),
            ("chat", "Explain borrow checking briefly"),
        ] {
            let req = test::TestRequest::post()
                .uri("/ai/task")
                .set_json(task_body(kind, prompt))
                .to_request();
            let _ = test::read_body(test::call_service(&app, req).await).await;
        }

        let req = test::TestRequest::get().uri("/ai/metrics/summary").to_request();
        let summary: MetricsSummary = test::call_and_read_body_json(&app, req).await;
        assert_eq!(summary.period_hours, 24);
        assert_eq!(summary.total_requests, 2);
        assert_eq!(summary.success_count, 2);
        assert_eq!(summary.success_rate, 1.0);
        assert_eq!(summary.by_kind.len(), 2);
        assert_eq!(summary.by_model["openai:gpt-4o-mini"].count, 2);

        let req = test::TestRequest::get()
            .uri("/ai/metrics/summary?hours=6&kind=chat")
            .to_request();
        let summary: MetricsSummary = test::call_and_read_body_json(&app, req).await;
        assert_eq!(summary.period_hours, 6);
        assert_eq!(summary.total_requests, 1);
        assert!(summary.by_kind.contains_key("chat"));

        let req = test::TestRequest::get()
            .uri("/ai/metrics/timeline?interval_minutes=5")
            .to_request();
        let timeline: MetricsTimeline = test::call_and_read_body_json(&app, req).await;
        assert_eq!(timeline.interval_minutes, 5);
        let counted: u64 = timeline.data.iter().map(|p| p.count).sum();
        assert_eq!(counted, 2);

        let req = test::TestRequest::get().uri("/ai/metrics/top-errors").to_request();
        let top: TopErrors = test::call_and_read_body_json(&app, req).await;
        assert!(top.errors.is_empty());
    }

    #[actix_web::test]
    async fn test_metrics_reject_out_of_range_queries() {
        let gateway = default_gateway();
        let app = test::init_service(HttpServer::create_app(state(&gateway, test_config()))).await;

        for uri in [
            "/ai/metrics/summary?hours=0",
            "/ai/metrics/summary?hours=169",
            "/ai/metrics/timeline?interval_minutes=1",
            "/ai/metrics/top-errors?limit=51",
        ] {
            let req = test::TestRequest::get().uri(uri).to_request();
            let resp = test::call_service(&app, req).await;
            assert_eq!(resp.status(), StatusCode::BAD_REQUEST, "{}", uri);
            let body: Value = test::read_body_json(resp).await;
            assert_eq!(body["error"]["code"], "VALIDATION_ERROR", "{}", uri);
        }
    }
}
