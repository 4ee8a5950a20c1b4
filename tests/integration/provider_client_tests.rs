//! Orchestrator over the real wire clients
//!
//! Runs on real time: wiremock answers over sockets, which paused time
//! would race against.

#[cfg(test)]
mod tests {
    use crate::common::{collect_events, terminal_event, test_config};
    use ai_task_gateway::config::models::{GatewayConfig, ProviderConfig};
    use ai_task_gateway::core::orchestrator::{TaskEvent, TaskOrchestrator};
    use ai_task_gateway::core::providers::ProviderRegistry;
    use ai_task_gateway::core::telemetry::MemoryTelemetrySink;
    use ai_task_gateway::core::types::{ProviderKind, TaskRequest, Usage};
    use std::sync::Arc;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const OPENAI_SSE: &str = concat!(
        "data: {\"choices\":[{\"delta\":{\"content\":\"Ownership \"}}]}\n\n",
        "data: {\"choices\":[{\"delta\":{\"content\":\"moves values.\"}}]}\n\n",
        "data: {\"choices\":[],\"usage\":{\"prompt_tokens\":30,\"completion_tokens\":5,\"total_tokens\":35}}\n\n",
        "data: [DONE]\n\n",
    );

    const OLLAMA_NDJSON: &str = concat!(
        "{\"response\":\"Local\",\"done\":false}\n",
        "{\"response\":\" answer\",\"done\":false}\n",
        "{\"response\":\"\",\"done\":true,\"prompt_eval_count\":11,\"eval_count\":2}\n",
    );

    fn gateway_config(openai: &MockServer, ollama: Option<&MockServer>) -> GatewayConfig {
        let mut config = test_config();
        config.orchestrator.base_delay_ms = 10;
        config.orchestrator.max_delay_ms = 50;

        let mut providers = vec![ProviderConfig {
            api_key: Some("sk-test".to_string()),
            api_base: Some(openai.uri()),
            timeout_secs: 5,
            ..ProviderConfig::new(ProviderKind::OpenAI)
        }];
        if let Some(ollama) = ollama {
            providers.push(ProviderConfig {
                api_base: Some(ollama.uri()),
                timeout_secs: 5,
                ..ProviderConfig::new(ProviderKind::Ollama)
            });
        }
        config.providers = providers;
        config
    }

    fn orchestrator(config: &GatewayConfig) -> (TaskOrchestrator, Arc<MemoryTelemetrySink>) {
        let registry = ProviderRegistry::from_configs(&config.providers).unwrap();
        let telemetry = Arc::new(MemoryTelemetrySink::new());
        let orchestrator =
            TaskOrchestrator::new(Arc::new(registry), config).with_telemetry(telemetry.clone());
        (orchestrator, telemetry)
    }

    #[tokio::test]
    async fn test_openai_stream_end_to_end() {
        let openai = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .and(header("authorization", "Bearer sk-test"))
            .respond_with(
                ResponseTemplate::new(200)
                    .insert_header("content-type", "text/event-stream")
                    .set_body_string(OPENAI_SSE),
            )
            .expect(1)
            .mount(&openai)
            .await;

        let config = gateway_config(&openai, None);
        let (orchestrator, telemetry) = orchestrator(&config);

        let stream = orchestrator
            .submit(TaskRequest::new("chat", "What does a move do in Rust?"), None)
            .await
            .unwrap();
        let events = collect_events(stream).await;

        let TaskEvent::Done(done) = terminal_event(&events) else {
            panic!("expected done event: {:?}", events);
        };
        assert_eq!(done.text, "Ownership moves values.");
        assert_eq!(done.usage, Some(Usage::new(30, 5)));
        assert!(done.estimated_cost_usd.unwrap() > 0.0);
        assert_eq!(telemetry.len(), 1);
    }

    #[tokio::test]
    async fn test_openai_auth_failure_falls_back_to_ollama() {
        let openai = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .respond_with(ResponseTemplate::new(401).set_body_string(
                r#"{"error":{"message":"Incorrect API key provided","code":"invalid_api_key"}}"#,
            ))
            .expect(1)
            .mount(&openai)
            .await;

        let ollama = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/tags"))
            .respond_with(ResponseTemplate::new(200).set_body_string("{\"models\":[]}"))
            .mount(&ollama)
            .await;
        Mock::given(method("POST"))
            .and(path("/api/generate"))
            .respond_with(ResponseTemplate::new(200).set_body_string(OLLAMA_NDJSON))
            .expect(1)
            .mount(&ollama)
            .await;

        let config = gateway_config(&openai, Some(&ollama));
        let (orchestrator, telemetry) = orchestrator(&config);

        let stream = orchestrator
            .submit(TaskRequest::new("chat", "What does a move do in Rust?"), None)
            .await
            .unwrap();
        let events = collect_events(stream).await;

        let TaskEvent::Done(done) = terminal_event(&events) else {
            panic!("expected done event: {:?}", events);
        };
        assert_eq!(done.provider, ProviderKind::Ollama);
        assert_eq!(done.model, "llama3");
        assert_eq!(done.text, "Local answer");
        // Local models carry no price
        assert_eq!(done.estimated_cost_usd, None);

        let outcome = &telemetry.outcomes()[0];
        assert_eq!(outcome.attempts, 2);
        assert_eq!(outcome.provider, ProviderKind::Ollama);
    }

    #[tokio::test]
    async fn test_upstream_503_is_retried_on_same_model() {
        let openai = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .respond_with(ResponseTemplate::new(503).set_body_string("upstream overloaded"))
            .up_to_n_times(1)
            .expect(1)
            .mount(&openai)
            .await;
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .respond_with(
                ResponseTemplate::new(200)
                    .insert_header("content-type", "text/event-stream")
                    .set_body_string(OPENAI_SSE),
            )
            .expect(1)
            .mount(&openai)
            .await;

        let config = gateway_config(&openai, None);
        let (orchestrator, _telemetry) = orchestrator(&config);

        let stream = orchestrator
            .submit(TaskRequest::new("chat", "What does a move do in Rust?"), None)
            .await
            .unwrap();
        let events = collect_events(stream).await;

        let TaskEvent::Done(done) = terminal_event(&events) else {
            panic!("expected done event: {:?}", events);
        };
        assert_eq!(done.provider, ProviderKind::OpenAI);
        assert_eq!(done.text, "Ownership moves values.");
    }

    #[tokio::test]
    async fn test_exhausted_error_hides_upstream_body() {
        let openai = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .respond_with(ResponseTemplate::new(400).set_body_string(
                r#"{"error":{"message":"secret internal detail xyz","type":"invalid_request_error"}}"#,
            ))
            .mount(&openai)
            .await;

        let config = gateway_config(&openai, None);
        let (orchestrator, telemetry) = orchestrator(&config);

        let stream = orchestrator
            .submit(TaskRequest::new("chat", "What does a move do in Rust?"), None)
            .await
            .unwrap();
        let events = collect_events(stream).await;

        let TaskEvent::Error(error) = terminal_event(&events) else {
            panic!("expected error event: {:?}", events);
        };
        assert!(!error.retryable);
        assert!(!error.message.contains("secret internal detail"));
        assert_eq!(telemetry.outcomes()[0].retryable, Some(false));
    }
}
