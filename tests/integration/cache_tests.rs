//! Response cache behaviour seen through the orchestrator

#[cfg(test)]
mod tests {
    use crate::common::{
        ScriptedProvider, Step, TestGateway, collect_events, terminal_event, test_config,
    };
    use ai_task_gateway::core::orchestrator::TaskEvent;
    use ai_task_gateway::core::types::{ProviderKind, TaskRequest};
    use serde_json::json;

    const PROMPT: &str = "Summarize the news today";

    async fn run(gateway: &TestGateway, request: TaskRequest) -> Vec<TaskEvent> {
        let stream = gateway.orchestrator.submit(request, None).await.unwrap();
        collect_events(stream).await
    }

    fn is_cached(events: &[TaskEvent]) -> bool {
        match terminal_event(events) {
            TaskEvent::Done(done) => done.cached,
            other => panic!("expected done event: {:?}", other),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_context_changes_key_but_volatile_fields_do_not() {
        let gateway = TestGateway::new(
            ScriptedProvider::replying("Headlines"),
            ScriptedProvider::replying("unused"),
        );

        let with_tab = |url: &str, opened_at: u64| {
            TaskRequest::new("search", PROMPT).with_context(json!({
                "active_tab": {"url": url, "title": "Front page"},
                "request_nonce": opened_at,
            }))
        };

        assert!(!is_cached(&run(&gateway, with_tab("https://a.example", 1)).await));
        assert!(is_cached(&run(&gateway, with_tab("https://a.example", 2)).await));
        assert!(!is_cached(&run(&gateway, with_tab("https://b.example", 3)).await));
        assert_eq!(gateway.openai.calls(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_fallback_answer_is_replayed_for_primary_key() {
        let gateway = TestGateway::new(
            ScriptedProvider::replying("unused").then(vec![Step::error("invalid_api_key", Some(401))]),
            ScriptedProvider::replying("Anthropic headlines"),
        );

        run(&gateway, TaskRequest::new("search", PROMPT)).await;
        let events = run(&gateway, TaskRequest::new("search", PROMPT)).await;

        let TaskEvent::Done(done) = terminal_event(&events) else {
            panic!("expected done event: {:?}", events);
        };
        assert!(done.cached);
        assert_eq!(done.provider, ProviderKind::Anthropic);
        assert_eq!(done.text, "Anthropic headlines");
        assert_eq!(gateway.provider_calls(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_short_prompts_and_disabled_cache_bypass() {
        let gateway = TestGateway::new(
            ScriptedProvider::replying("Done"),
            ScriptedProvider::replying("unused"),
        );
        run(&gateway, TaskRequest::new("search", "scroll")).await;
        run(&gateway, TaskRequest::new("search", "scroll")).await;
        assert_eq!(gateway.openai.calls(), 2);
        assert!(gateway.orchestrator.cache().is_empty());

        let mut config = test_config();
        config.cache.enabled = false;
        let gateway = TestGateway::with_config(
            ScriptedProvider::replying("Headlines"),
            ScriptedProvider::replying("unused"),
            &config,
        );
        run(&gateway, TaskRequest::new("search", PROMPT)).await;
        run(&gateway, TaskRequest::new("search", PROMPT)).await;
        assert_eq!(gateway.openai.calls(), 2);
        assert!(gateway.orchestrator.cache().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_clear_forces_fresh_answer() {
        let gateway = TestGateway::new(
            ScriptedProvider::replying("Headlines"),
            ScriptedProvider::replying("unused"),
        );

        run(&gateway, TaskRequest::new("summary", PROMPT)).await;
        assert_eq!(gateway.orchestrator.cache().clear(), 1);

        let events = run(&gateway, TaskRequest::new("summary", PROMPT)).await;
        assert!(!is_cached(&events));
        assert_eq!(gateway.openai.calls(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_error_outcome_is_never_cached() {
        let gateway = TestGateway::new(
            ScriptedProvider::with_default(vec![Step::error("invalid_api_key", Some(401))]),
            ScriptedProvider::with_default(vec![Step::error("invalid x-api-key", Some(401))]),
        );

        let events = run(&gateway, TaskRequest::new("search", PROMPT)).await;
        assert!(matches!(terminal_event(&events), TaskEvent::Error(_)));
        assert!(gateway.orchestrator.cache().is_empty());
    }
}
