//! Orchestrator scenario tests
//!
//! Time is paused in every test so backoff delays and attempt timeouts are
//! observed exactly without sleeping.

#[cfg(test)]
mod tests {
    use crate::common::providers::reply;
    use crate::common::{
        CapturedLogs, LimiterCall, RecordingRateLimiter, ScriptedProvider, Step, TestGateway,
        collect_events, delta_text, terminal_event, test_config,
    };
    use ai_task_gateway::core::classifier::FailureKind;
    use ai_task_gateway::core::context::CitationSource;
    use ai_task_gateway::core::orchestrator::{TaskEvent, preflight_cost};
    use ai_task_gateway::core::providers::ProviderError;
    use ai_task_gateway::core::telemetry::OutcomeStatus;
    use ai_task_gateway::core::types::{MessageRole, ProviderKind, TaskRequest, Usage};
    use ai_task_gateway::{GatewayError, Result};
    use async_trait::async_trait;
    use futures::StreamExt;
    use serde_json::{Value, json};
    use std::sync::Arc;
    use std::time::Duration;
    use tokio::time::Instant;
    use tracing::Instrument;

    const NEWS_PROMPT: &str = "Summarize the news today";

    fn search_task() -> TaskRequest {
        TaskRequest::new("search", NEWS_PROMPT)
    }

    /// An empty prompt is rejected before anything else runs
    #[tokio::test(start_paused = true)]
    async fn test_empty_prompt_rejected_before_providers() {
        let gateway = TestGateway::new(
            ScriptedProvider::replying("unused"),
            ScriptedProvider::replying("unused"),
        );

        let result = gateway
            .orchestrator
            .submit(TaskRequest::new("search", "   "), Some("10.0.0.1"))
            .await;

        assert!(matches!(result, Err(GatewayError::Validation(_))));
        assert_eq!(gateway.provider_calls(), 0);
        assert!(gateway.telemetry.is_empty());
        assert!(gateway.orchestrator.cache().is_empty());
    }

    /// A first search call streams, succeeds and is cached
    #[tokio::test(start_paused = true)]
    async fn test_search_success_is_cached() {
        let gateway = TestGateway::new(
            ScriptedProvider::with_default(reply("Markets rallied today.", Usage::new(40, 10))),
            ScriptedProvider::replying("unused"),
        );

        let stream = tokio_test::assert_ok!(gateway.orchestrator.submit(search_task(), None).await);
        let events = collect_events(stream).await;

        assert!(events.len() > 2, "text should arrive incrementally");
        assert_eq!(delta_text(&events), "Markets rallied today.");

        let TaskEvent::Done(done) = terminal_event(&events) else {
            panic!("expected done event: {:?}", events);
        };
        assert!(!done.cached);
        assert_eq!(done.provider, ProviderKind::OpenAI);
        assert_eq!(done.model, "gpt-4o-mini");
        assert_eq!(done.text, "Markets rallied today.");
        assert_eq!(done.usage, Some(Usage::new(40, 10)));
        let cost = done.estimated_cost_usd.unwrap();
        assert!((cost - 0.00003).abs() < 1e-12);

        assert_eq!(gateway.openai.calls(), 1);
        assert_eq!(gateway.orchestrator.cache().len(), 1);

        // Search TTL is 30 minutes
        tokio::time::advance(Duration::from_secs(1799)).await;
        assert_eq!(gateway.orchestrator.cache().stats().valid_entries, 1);
        tokio::time::advance(Duration::from_secs(2)).await;
        assert_eq!(gateway.orchestrator.cache().stats().expired_entries, 1);

        let outcomes = gateway.telemetry.outcomes();
        assert_eq!(outcomes.len(), 1);
        assert_eq!(outcomes[0].status, OutcomeStatus::Success);
        assert_eq!(outcomes[0].attempts, 1);
        assert!(!outcomes[0].cached);
    }

    /// A repeat within the TTL replays from cache without provider calls
    #[tokio::test(start_paused = true)]
    async fn test_repeat_within_ttl_replays_cache() {
        let answer = "Markets rallied today on strong earnings.";
        let gateway = TestGateway::new(
            ScriptedProvider::with_default(reply(answer, Usage::new(40, 10))),
            ScriptedProvider::replying("unused"),
        );

        let first = gateway.orchestrator.submit(search_task(), None).await.unwrap();
        collect_events(first).await;

        tokio::time::advance(Duration::from_secs(600)).await;

        let second = gateway.orchestrator.submit(search_task(), None).await.unwrap();
        let events = collect_events(second).await;

        assert_eq!(gateway.openai.calls(), 1);
        assert_eq!(gateway.anthropic.calls(), 0);

        let deltas: Vec<&TaskEvent> = events.iter().filter(|e| !e.is_terminal()).collect();
        assert_eq!(deltas.len(), answer.chars().count().div_ceil(10));
        assert_eq!(delta_text(&events), answer);

        let TaskEvent::Done(done) = terminal_event(&events) else {
            panic!("expected done event: {:?}", events);
        };
        assert!(done.cached);
        assert_eq!(done.estimated_cost_usd, Some(0.0));
        assert_eq!(done.latency_ms, 0);
        assert_eq!(done.text, answer);

        let outcomes = gateway.telemetry.outcomes();
        assert_eq!(outcomes.len(), 2);
        assert!(outcomes[1].cached);
        assert_eq!(outcomes[1].attempts, 0);
    }

    /// A non-retryable failure falls back without backoff
    #[tokio::test(start_paused = true)]
    async fn test_invalid_api_key_falls_back_to_next_provider() {
        let gateway = TestGateway::new(
            ScriptedProvider::replying("unused")
                .then(vec![Step::error("invalid_api_key", Some(401))]),
            ScriptedProvider::replying("Fallback answer"),
        );

        let started = Instant::now();
        let stream = gateway
            .orchestrator
            .submit(TaskRequest::new("chat", "Explain borrow checking briefly"), None)
            .await
            .unwrap();
        let events = collect_events(stream).await;

        assert!(started.elapsed() < Duration::from_millis(500));
        assert_eq!(gateway.openai.calls(), 1);
        assert_eq!(gateway.anthropic.calls(), 1);

        let TaskEvent::Done(done) = terminal_event(&events) else {
            panic!("expected done event: {:?}", events);
        };
        assert_eq!(done.provider, ProviderKind::Anthropic);
        assert_eq!(done.model, "claude-3-haiku-20240307");
        assert_eq!(done.text, "Fallback answer");

        let request = &gateway.anthropic.requests()[0];
        assert_eq!(request.model, "claude-3-haiku-20240307");

        let outcomes = gateway.telemetry.outcomes();
        assert_eq!(outcomes[0].attempts, 2);
        assert_eq!(outcomes[0].provider, ProviderKind::Anthropic);
    }

    /// Three timeouts exhaust the attempts
    #[tokio::test(start_paused = true)]
    async fn test_repeated_timeouts_exhaust_attempts() {
        let gateway = TestGateway::new(
            ScriptedProvider::with_default(vec![Step::Hang]),
            ScriptedProvider::replying("unused"),
        );

        let started = Instant::now();
        let stream = gateway
            .orchestrator
            .submit(TaskRequest::new("chat", "Explain borrow checking briefly"), None)
            .await
            .unwrap();
        let events = collect_events(stream).await;

        // Three 60s attempt deadlines plus 0.5s and 1s of backoff
        let elapsed = started.elapsed();
        assert!(elapsed >= Duration::from_millis(181_500), "{:?}", elapsed);
        assert!(elapsed < Duration::from_secs(182), "{:?}", elapsed);

        assert_eq!(gateway.openai.calls(), 3);
        assert_eq!(gateway.anthropic.calls(), 0);

        let TaskEvent::Error(error) = terminal_event(&events) else {
            panic!("expected error event: {:?}", events);
        };
        assert!(error.retryable);
        assert_eq!(error.kind, FailureKind::Timeout);
        assert!(error.message.starts_with("Request timed out"));
        assert_eq!(error.provider, ProviderKind::OpenAI);
        assert!(gateway.orchestrator.cache().is_empty());

        let outcomes = gateway.telemetry.outcomes();
        assert_eq!(outcomes.len(), 1);
        assert_eq!(outcomes[0].status, OutcomeStatus::Error);
        assert_eq!(outcomes[0].attempts, 3);
        assert_eq!(outcomes[0].error_type, Some(FailureKind::Timeout));
        assert_eq!(outcomes[0].retryable, Some(true));
    }

    #[tokio::test(start_paused = true)]
    async fn test_retryable_failure_keeps_same_model() {
        let gateway = TestGateway::new(
            ScriptedProvider::replying("Recovered answer")
                .then(vec![Step::text("partial "), Step::error("Service Unavailable", Some(503))]),
            ScriptedProvider::replying("unused"),
        );

        let started = Instant::now();
        let stream = gateway
            .orchestrator
            .submit(TaskRequest::new("chat", "Explain borrow checking briefly"), None)
            .await
            .unwrap();
        let events = collect_events(stream).await;

        assert_eq!(started.elapsed(), Duration::from_millis(500));
        assert_eq!(gateway.openai.calls(), 2);
        assert_eq!(gateway.anthropic.calls(), 0);

        let TaskEvent::Done(done) = terminal_event(&events) else {
            panic!("expected done event: {:?}", events);
        };
        // Only the successful attempt's text is kept
        assert_eq!(done.text, "Recovered answer");
        assert_eq!(done.provider, ProviderKind::OpenAI);
    }

    #[tokio::test(start_paused = true)]
    async fn test_refused_call_and_stream_error_both_trigger_fallback() {
        let gateway = TestGateway::new(
            ScriptedProvider::replying("Third time lucky").then(vec![Step::Refuse(
                ProviderError::Authentication {
                    provider: "openai",
                    message: "bad key".to_string(),
                },
            )]),
            ScriptedProvider::replying("unused").then(vec![
                Step::text("half"),
                Step::Fail(ProviderError::InvalidRequest {
                    provider: "anthropic",
                    message: "context too long".to_string(),
                }),
            ]),
        );

        let stream = gateway
            .orchestrator
            .submit(TaskRequest::new("chat", "Explain borrow checking briefly"), None)
            .await
            .unwrap();
        let events = collect_events(stream).await;

        // openai -> anthropic -> (ollama unregistered) -> openai again
        assert_eq!(gateway.openai.calls(), 2);
        assert_eq!(gateway.anthropic.calls(), 1);
        let TaskEvent::Done(done) = terminal_event(&events) else {
            panic!("expected done event: {:?}", events);
        };
        assert_eq!(done.provider, ProviderKind::OpenAI);
        assert_eq!(done.text, "Third time lucky");
        assert_eq!(gateway.telemetry.outcomes()[0].attempts, 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_non_cacheable_kind_skips_cache() {
        let gateway = TestGateway::new(
            ScriptedProvider::replying("Clicked the button"),
            ScriptedProvider::replying("unused"),
        );

        for _ in 0..2 {
            let stream = gateway
                .orchestrator
                .submit(TaskRequest::new("agent", "Open the settings page please"), None)
                .await
                .unwrap();
            collect_events(stream).await;
        }

        assert_eq!(gateway.openai.calls(), 2);
        assert!(gateway.orchestrator.cache().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_dropped_stream_records_nothing() {
        let gateway = TestGateway::new(
            ScriptedProvider::with_default(vec![Step::text("partial "), Step::Hang]),
            ScriptedProvider::replying("unused"),
        );

        let mut stream = gateway.orchestrator.submit(search_task(), None).await.unwrap();
        assert_eq!(stream.next().await, Some(TaskEvent::Delta("partial ".to_string())));
        drop(stream);

        assert!(gateway.telemetry.is_empty());
        assert!(gateway.orchestrator.cache().is_empty());
        assert_eq!(gateway.openai.calls(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_rate_limit_denial_is_not_an_outcome() {
        let mut config = test_config();
        config.rate_limit.enabled = true;
        config.rate_limit.requests_per_minute = 1;
        let gateway = TestGateway::with_config(
            ScriptedProvider::replying("First answer"),
            ScriptedProvider::replying("unused"),
            &config,
        );

        let request = TaskRequest::new("chat", "Explain borrow checking briefly")
            .with_metadata("client_id", json!("tenant-1"));
        let stream = gateway.orchestrator.submit(request.clone(), None).await.unwrap();
        collect_events(stream).await;

        let denied = gateway.orchestrator.submit(request.clone(), None).await;
        assert!(matches!(denied, Err(GatewayError::RateLimit(_))));
        assert_eq!(gateway.openai.calls(), 1);
        assert_eq!(gateway.telemetry.len(), 1);

        // Another client is unaffected
        let other = TaskRequest::new("chat", "Explain borrow checking briefly");
        tokio_test::assert_ok!(gateway.orchestrator.submit(other, Some("10.9.9.9")).await);
    }

    #[tokio::test(start_paused = true)]
    async fn test_context_and_caller_overrides_shape_the_request() {
        let gateway = TestGateway::new(
            ScriptedProvider::replying("Noted"),
            ScriptedProvider::replying("unused"),
        );

        let request = TaskRequest::new("search", NEWS_PROMPT)
            .with_context(json!({
                "memories": [{"value": "Prefers European markets"}]
            }))
            .with_metadata("cost_tier", json!("premium"));
        let stream = gateway.orchestrator.submit(request, None).await.unwrap();
        collect_events(stream).await;

        let sent = &gateway.openai.requests()[0];
        assert_eq!(sent.model, "gpt-4o");
        // Search default of 1500 inflated by 30%
        assert_eq!(sent.max_tokens, 1950);
        assert_eq!(sent.messages.len(), 3);
        assert_eq!(sent.messages[1].role, MessageRole::System);
        assert!(sent.messages[1].content.contains("Prefers European markets"));
        assert_eq!(sent.messages[2].role, MessageRole::User);
        assert_eq!(sent.messages[2].content, NEWS_PROMPT);

        let mut request = TaskRequest::new("chat", "Explain borrow checking briefly");
        request.max_tokens = Some(50_000);
        request.temperature = Some(0.1);
        let stream = gateway.orchestrator.submit(request, None).await.unwrap();
        collect_events(stream).await;

        let sent = &gateway.openai.requests()[1];
        assert_eq!(sent.max_tokens, 2000);
        assert!((sent.temperature - 0.1).abs() < f32::EPSILON);
    }

    struct FixedCitations;

    #[async_trait]
    impl CitationSource for FixedCitations {
        async fn lookup(&self, _query: &str, max_results: usize) -> Result<Vec<Value>> {
            let results: Vec<Value> = (1..=10)
                .map(|i| {
                    json!({
                        "title": format!("Story {}", i),
                        "url": format!("https://news.example.com/{}", i),
                        "snippet": "Headline",
                    })
                })
                .collect();
            Ok(results.into_iter().take(max_results).collect())
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_search_citations_reach_prompt_and_payload() {
        let gateway = TestGateway::new(
            ScriptedProvider::replying("Here is the summary"),
            ScriptedProvider::replying("unused"),
        );
        let orchestrator = gateway
            .orchestrator
            .clone()
            .with_citation_source(Arc::new(FixedCitations));

        let events = collect_events(orchestrator.submit(search_task(), None).await.unwrap()).await;
        let TaskEvent::Done(done) = terminal_event(&events) else {
            panic!("expected done event: {:?}", events);
        };
        assert_eq!(done.citations.len(), 8);
        assert_eq!(done.citations[0].index, 1);
        assert_eq!(done.citations[0].title, "Story 1");

        let sent = &gateway.openai.requests()[0];
        let last = sent.messages.last().unwrap();
        assert_eq!(last.role, MessageRole::System);
        assert!(last.content.starts_with("Search sources:"));

        // Replay carries the stored citations
        let events = collect_events(orchestrator.submit(search_task(), None).await.unwrap()).await;
        let TaskEvent::Done(done) = terminal_event(&events) else {
            panic!("expected done event: {:?}", events);
        };
        assert!(done.cached);
        assert_eq!(done.citations.len(), 8);
    }

    #[tokio::test(start_paused = true)]
    async fn test_actual_cost_reported_to_limiter_once() {
        let limiter = Arc::new(RecordingRateLimiter::new());
        let gateway = TestGateway::new(
            ScriptedProvider::with_default(reply("Markets rallied today.", Usage::new(40, 10))),
            ScriptedProvider::replying("unused"),
        );
        let orchestrator = gateway.orchestrator.clone().with_rate_limiter(limiter.clone());

        let events =
            collect_events(orchestrator.submit(search_task(), Some("10.0.0.7")).await.unwrap()).await;
        let TaskEvent::Done(done) = terminal_event(&events) else {
            panic!("expected done event: {:?}", events);
        };
        let actual = done.estimated_cost_usd.unwrap();

        let checks = limiter.checks();
        assert_eq!(checks.len(), 1);
        assert_eq!(checks[0].cost, preflight_cost(NEWS_PROMPT));
        assert_ne!(checks[0].cost, actual);

        assert_eq!(
            limiter.records(),
            vec![LimiterCall {
                client_id: "10.0.0.7".to_string(),
                kind: "search".to_string(),
                cost: actual,
            }]
        );

        // A replay is admitted but costs nothing
        let events =
            collect_events(orchestrator.submit(search_task(), Some("10.0.0.7")).await.unwrap()).await;
        assert!(matches!(terminal_event(&events), TaskEvent::Done(done) if done.cached));
        assert_eq!(limiter.checks().len(), 2);
        assert_eq!(limiter.records().len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_exhausted_task_reports_no_spend() {
        let limiter = Arc::new(RecordingRateLimiter::new());
        let gateway = TestGateway::new(
            ScriptedProvider::with_default(vec![Step::error("invalid_api_key", Some(401))]),
            ScriptedProvider::with_default(vec![Step::error("invalid x-api-key", Some(401))]),
        );
        let orchestrator = gateway.orchestrator.clone().with_rate_limiter(limiter.clone());

        let request = TaskRequest::new("chat", "Explain borrow checking briefly");
        let events = collect_events(orchestrator.submit(request, None).await.unwrap()).await;

        assert!(matches!(terminal_event(&events), TaskEvent::Error(_)));
        assert_eq!(gateway.provider_calls(), 3);
        assert_eq!(limiter.checks().len(), 1);
        assert!(limiter.records().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_abandoned_replay_records_nothing() {
        let answer = "Markets rallied today on strong earnings.";
        let gateway = TestGateway::new(
            ScriptedProvider::with_default(reply(answer, Usage::new(40, 10))),
            ScriptedProvider::replying("unused"),
        );

        collect_events(gateway.orchestrator.submit(search_task(), None).await.unwrap()).await;
        assert_eq!(gateway.telemetry.len(), 1);

        let mut replay = gateway.orchestrator.submit(search_task(), None).await.unwrap();
        assert_eq!(replay.next().await, Some(TaskEvent::Delta("Markets ra".to_string())));
        drop(replay);

        assert_eq!(gateway.telemetry.len(), 1);
        assert_eq!(gateway.openai.calls(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_attempt_logs_carry_the_submitting_span() {
        let logs = CapturedLogs::default();
        let _subscriber = tracing::subscriber::set_default(logs.subscriber());

        let gateway = TestGateway::new(
            ScriptedProvider::replying("Recovered answer")
                .then(vec![Step::error("Service Unavailable", Some(503))]),
            ScriptedProvider::replying("unused"),
        );

        let span = tracing::info_span!("ai_task", request_id = "req-7f3a");
        let stream = gateway
            .orchestrator
            .submit(TaskRequest::new("chat", "Explain borrow checking briefly"), None)
            .instrument(span)
            .await
            .unwrap();
        // Polled outside the span, as the HTTP body is
        let events = collect_events(stream).await;
        assert!(matches!(terminal_event(&events), TaskEvent::Done(_)));

        let failed = logs.lines_with("AI task attempt failed");
        assert_eq!(failed.len(), 1);
        assert!(failed[0].contains("req-7f3a"), "{}", failed[0]);

        let completed = logs.lines_with("ai_task completed");
        assert_eq!(completed.len(), 1);
        assert!(completed[0].contains("req-7f3a"), "{}", completed[0]);
    }
}
