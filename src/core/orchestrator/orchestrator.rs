//! Task orchestrator
//!
//! Drives one task from admission to its terminal event: cache lookup, the
//! attempt loop with backoff and fallback, cache write, telemetry.

use super::budget::{TokenBudget, estimate_cost, preflight_cost};
use super::events::{DonePayload, ErrorPayload, TaskEvent};
use super::prepare::{CacheSlot, PreparedTask, resolve_client_id};
use super::retry::{NextStep, RetrySettings};
use super::state::{AttemptEnd, AttemptState};
use crate::config::models::GatewayConfig;
use crate::core::cache_manager::{CacheKey, CachePolicy, ResponseCache, hash_context};
use crate::core::classifier::{
    ErrorDetail, FailureKind, TaskFailure, extract_details, user_message,
};
use crate::core::context::{
    CitationSource, ContextBuilder, DefaultContextBuilder, MAX_CITATIONS, normalize_citations,
    sources_block,
};
use crate::core::policy::{PolicyEngine, StaticPolicy};
use crate::core::providers::{ChunkStream, ProviderRegistry, ProviderRequest};
use crate::core::rate_limiter::{SlidingWindowRateLimiter, TaskRateLimiter};
use crate::core::telemetry::{OutcomeStatus, TaskOutcome, TelemetrySink, TracingTelemetrySink};
use crate::core::types::{CachedResponse, ChatMessage, ModelSpec, TaskRequest, Usage};
use crate::utils::error::{GatewayError, Result};
use futures::{Stream, StreamExt};
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};
use std::time::Duration;
use tokio::time::{Instant, timeout_at};
use tracing::{Span, debug, info, warn};

/// Events of one task; ends with exactly one terminal event
pub type TaskStream = Pin<Box<dyn Stream<Item = TaskEvent> + Send>>;

/// Enters `span` around every poll of the task stream
struct InSpan {
    inner: TaskStream,
    span: Span,
}

impl Stream for InSpan {
    type Item = TaskEvent;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<TaskEvent>> {
        let this = self.get_mut();
        let _entered = this.span.enter();
        this.inner.as_mut().poll_next(cx)
    }
}

/// Streaming retry/fallback orchestrator
///
/// Cheap to clone; every collaborator is shared.
#[derive(Clone)]
pub struct TaskOrchestrator {
    registry: Arc<ProviderRegistry>,
    policy: Arc<dyn PolicyEngine>,
    limiter: Arc<dyn TaskRateLimiter>,
    context_builder: Arc<dyn ContextBuilder>,
    citation_source: Option<Arc<dyn CitationSource>>,
    telemetry: Arc<dyn TelemetrySink>,
    cache: Arc<ResponseCache>,
    cache_policy: Arc<CachePolicy>,
    retry: RetrySettings,
    budget: TokenBudget,
    attempt_timeout: Duration,
    replay_chunk_size: usize,
}

impl TaskOrchestrator {
    /// Orchestrator with the default collaborators for `config`
    pub fn new(registry: Arc<ProviderRegistry>, config: &GatewayConfig) -> Self {
        Self {
            registry,
            policy: Arc::new(StaticPolicy::new(&config.policy)),
            limiter: Arc::new(SlidingWindowRateLimiter::new(config.rate_limit.clone())),
            context_builder: Arc::new(DefaultContextBuilder::default()),
            citation_source: None,
            telemetry: Arc::new(TracingTelemetrySink),
            cache: Arc::new(ResponseCache::new(config.cache.max_entries)),
            cache_policy: Arc::new(CachePolicy::new(config.cache.clone())),
            retry: RetrySettings::from(&config.orchestrator),
            budget: TokenBudget::from(&config.policy),
            attempt_timeout: config.orchestrator.attempt_timeout(),
            replay_chunk_size: config.orchestrator.replay_chunk_size.max(1),
        }
    }

    pub fn with_policy(mut self, policy: Arc<dyn PolicyEngine>) -> Self {
        self.policy = policy;
        self
    }

    pub fn with_rate_limiter(mut self, limiter: Arc<dyn TaskRateLimiter>) -> Self {
        self.limiter = limiter;
        self
    }

    pub fn with_context_builder(mut self, builder: Arc<dyn ContextBuilder>) -> Self {
        self.context_builder = builder;
        self
    }

    pub fn with_citation_source(mut self, source: Arc<dyn CitationSource>) -> Self {
        self.citation_source = Some(source);
        self
    }

    pub fn with_telemetry(mut self, telemetry: Arc<dyn TelemetrySink>) -> Self {
        self.telemetry = telemetry;
        self
    }

    /// Share a cache between orchestrators
    pub fn with_cache(mut self, cache: Arc<ResponseCache>) -> Self {
        self.cache = cache;
        self
    }

    pub fn with_retry_settings(mut self, retry: RetrySettings) -> Self {
        self.retry = retry;
        self
    }

    pub fn cache(&self) -> &Arc<ResponseCache> {
        &self.cache
    }

    pub fn registry(&self) -> &Arc<ProviderRegistry> {
        &self.registry
    }

    pub fn retry_settings(&self) -> RetrySettings {
        self.retry
    }

    /// Admit a task and return its event stream
    ///
    /// Validation and rate-limit failures are returned here, before any
    /// provider or cache access. Everything after admission is reported
    /// in-band through the stream's terminal event. Dropping the stream
    /// abandons the in-flight provider call.
    ///
    /// The stream is driven inside the span current at submission, so the
    /// attempt logs carry the caller's request fields.
    pub async fn submit(&self, request: TaskRequest, transport_id: Option<&str>) -> Result<TaskStream> {
        let prompt = request.prompt.trim();
        if prompt.is_empty() {
            return Err(GatewayError::validation("Prompt cannot be empty"));
        }
        let kind = request.kind.trim();
        if kind.is_empty() {
            return Err(GatewayError::validation("Task kind cannot be empty"));
        }

        let client_id = resolve_client_id(&request, transport_id);
        let decision = self.limiter.check(&client_id, kind, preflight_cost(prompt)).await;
        if !decision.allowed {
            let reason = decision
                .reason
                .unwrap_or_else(|| "Rate limit exceeded".to_string());
            warn!(client_id = %client_id, kind, reason = %reason, "Rate limit exceeded");
            return Err(GatewayError::rate_limit(reason));
        }

        let task = self.prepare(request, client_id).await;
        Ok(Box::pin(InSpan {
            inner: self.clone().run(task),
            span: Span::current(),
        }))
    }

    async fn prepare(&self, request: TaskRequest, client_id: String) -> PreparedTask {
        let started = Instant::now();
        let prompt = request.prompt.trim().to_string();
        let kind = request.kind.trim().to_string();

        let cost_tier = self.policy.resolve_cost_tier(&request.metadata);
        let mut available = self.registry.available().await;
        if available.is_empty() {
            let fallback = self.policy.default_provider();
            debug!(provider = %fallback, "No provider reports available; assuming default");
            available.insert(fallback);
        }
        let base = self.policy.select_model(&kind, cost_tier, &available);

        let system_prompt = request
            .mode
            .as_deref()
            .and_then(|mode| self.policy.mode_prompt(mode))
            .unwrap_or_else(|| self.policy.system_prompt(&kind));

        let enhanced = request
            .context
            .as_ref()
            .map(|context| self.context_builder.enhance(context))
            .unwrap_or_default();
        let enhanced_context = !enhanced.trim().is_empty();

        let mut messages = vec![ChatMessage::system(system_prompt)];
        if enhanced_context {
            messages.push(ChatMessage::system(enhanced));
        }
        messages.push(ChatMessage::user(prompt.clone()));

        let mut citations = Vec::new();
        if kind.eq_ignore_ascii_case("search") {
            if let Some(source) = &self.citation_source {
                match source.lookup(&prompt, MAX_CITATIONS).await {
                    Ok(raw) => citations = normalize_citations(&raw),
                    Err(e) => warn!(error = %e, "Citation lookup failed for ai_task"),
                }
            }
            if let Some(block) = sources_block(&citations) {
                messages.push(ChatMessage::system(block));
            }
        }

        let cache = self.cache_policy.should_cache(&kind, &prompt).then(|| CacheSlot {
            key: CacheKey::new(
                &prompt,
                &kind,
                &base.model,
                &hash_context(request.context.as_ref()),
            ),
            ttl: self.cache_policy.ttl_for(&kind),
        });

        let mut task = PreparedTask {
            has_context: request.has_context(),
            kind,
            mode: request.mode,
            prompt,
            metadata: request.metadata,
            enhanced_context,
            requested_max_tokens: request.max_tokens,
            requested_temperature: request.temperature,
            client_id,
            cost_tier,
            available,
            primary: base.clone(),
            base: base.clone(),
            messages,
            citations,
            cache,
            started,
        };
        task.primary = self.tune(&task, base);
        task
    }

    /// Apply the caller's overrides and the token budget to a policy spec
    fn tune(&self, task: &PreparedTask, spec: ModelSpec) -> ModelSpec {
        let max_tokens = self.budget.max_tokens(
            spec.max_tokens,
            task.requested_max_tokens,
            task.enhanced_context,
        );
        let temperature = task
            .requested_temperature
            .unwrap_or(spec.temperature)
            .clamp(0.0, 2.0);
        spec.with_max_tokens(max_tokens).with_temperature(temperature)
    }

    fn run(self, task: PreparedTask) -> TaskStream {
        Box::pin(async_stream::stream! {
            if let Some(slot) = &task.cache {
                if let Some(hit) = self.cache.get(&slot.key, slot.ttl) {
                    debug!(kind = %task.kind, model = %hit.model, "Cache hit");
                    for event in self.replay_deltas(&hit.text) {
                        yield event;
                    }
                    yield self.finish_replay(&task, hit);
                    return;
                }
            }

            let mut state = AttemptState::Attempt { spec: task.primary.clone(), attempt: 1 };
            loop {
                state = match state {
                    AttemptState::Attempt { spec, attempt } => {
                        let deadline = Instant::now() + self.attempt_timeout;
                        let mut text = String::new();

                        let end = match self.open_stream(&task, &spec, deadline).await {
                            Err(failure) => AttemptEnd::Failed(failure),
                            Ok(mut chunks) => {
                                let mut usage = None;
                                loop {
                                    match timeout_at(deadline, chunks.next()).await {
                                        Err(_) => {
                                            break AttemptEnd::Failed(TaskFailure::timeout(
                                                spec.provider.display_name(),
                                            ));
                                        }
                                        Ok(None) => {
                                            break AttemptEnd::Failed(
                                                TaskFailure::new(
                                                    "Provider stream ended before completion",
                                                    None,
                                                )
                                                .with_kind(FailureKind::Network)
                                                .retryable(),
                                            );
                                        }
                                        Ok(Some(Err(e))) => break AttemptEnd::Failed(TaskFailure::from(e)),
                                        Ok(Some(Ok(chunk))) => {
                                            if chunk.is_error() {
                                                break AttemptEnd::Failed(TaskFailure::from_chunk(&chunk));
                                            }
                                            if chunk.usage.is_some() {
                                                usage = chunk.usage;
                                            }
                                            let done = chunk.done;
                                            if !chunk.text.is_empty() {
                                                text.push_str(&chunk.text);
                                                yield TaskEvent::Delta(chunk.text);
                                            }
                                            if done {
                                                break AttemptEnd::Completed(usage);
                                            }
                                        }
                                    }
                                }
                            }
                        };

                        match end {
                            AttemptEnd::Completed(usage) => AttemptState::Succeeded { spec, attempt, text, usage },
                            AttemptEnd::Failed(failure) => AttemptState::Failed { spec, attempt, failure },
                        }
                    }
                    AttemptState::Failed { spec, attempt, failure } => {
                        let detail = extract_details(&failure);
                        warn!(
                            attempt,
                            max_attempts = self.retry.max_attempts,
                            kind = %task.kind,
                            provider = %spec.provider,
                            model = %spec.model,
                            error_type = %detail.kind,
                            retryable = detail.retryable,
                            status = ?detail.status_code,
                            body = detail.response_body.as_deref().unwrap_or(""),
                            error = %failure.message,
                            "AI task attempt failed"
                        );

                        match self.retry.next_step(detail.retryable, attempt) {
                            NextStep::Retry(delay) => {
                                debug!(delay_ms = delay.as_millis() as u64, attempt, "Retrying after backoff");
                                tokio::time::sleep(delay).await;
                                AttemptState::Attempt { spec, attempt: attempt + 1 }
                            }
                            NextStep::Fallback => match self.policy.fallback_for(&spec, &task.available) {
                                Some(next) => {
                                    info!(
                                        kind = %task.kind,
                                        from_provider = %spec.provider,
                                        from_model = %spec.model,
                                        provider = %next.provider,
                                        model = %next.model,
                                        error_type = %detail.kind,
                                        "Falling back to alternate model"
                                    );
                                    let next = next
                                        .with_max_tokens(task.base.max_tokens)
                                        .with_temperature(task.base.temperature);
                                    AttemptState::Attempt { spec: self.tune(&task, next), attempt: attempt + 1 }
                                }
                                None => AttemptState::Exhausted { spec, attempt, failure, detail },
                            },
                            NextStep::GiveUp => AttemptState::Exhausted { spec, attempt, failure, detail },
                        }
                    }
                    AttemptState::Succeeded { spec, attempt, text, usage } => {
                        yield self.finish_success(&task, spec, attempt, text, usage).await;
                        return;
                    }
                    AttemptState::Exhausted { spec, attempt, failure, detail } => {
                        yield self.finish_error(&task, spec, attempt, failure, detail);
                        return;
                    }
                };
            }
        })
    }

    async fn open_stream(
        &self,
        task: &PreparedTask,
        spec: &ModelSpec,
        deadline: Instant,
    ) -> std::result::Result<ChunkStream, TaskFailure> {
        let Some(provider) = self.registry.get(spec.provider) else {
            return Err(TaskFailure::new(
                format!("{} provider not configured", spec.provider.display_name()),
                None,
            )
            .with_kind(FailureKind::ProviderError)
            .non_retryable());
        };

        let request = ProviderRequest {
            messages: task.messages.clone(),
            model: spec.model.clone(),
            temperature: spec.temperature,
            max_tokens: spec.max_tokens,
        };

        match timeout_at(deadline, provider.stream(request)).await {
            Err(_) => Err(TaskFailure::timeout(spec.provider.display_name())),
            Ok(result) => result.map_err(TaskFailure::from),
        }
    }

    fn replay_deltas(&self, text: &str) -> Vec<TaskEvent> {
        let chars: Vec<char> = text.chars().collect();
        chars
            .chunks(self.replay_chunk_size)
            .map(|chunk| TaskEvent::Delta(chunk.iter().collect()))
            .collect()
    }

    /// Terminal event of a replay; recorded only once every delta went out
    fn finish_replay(&self, task: &PreparedTask, hit: CachedResponse) -> TaskEvent {
        let spec = ModelSpec::new(hit.provider, hit.model.clone());
        self.telemetry.record(TaskOutcome {
            latency_ms: 0,
            cached: true,
            usage: hit.usage,
            estimated_cost_usd: Some(0.0),
            citations_count: hit.citations.len(),
            ..task.outcome(OutcomeStatus::Success, &spec, 0)
        });

        TaskEvent::Done(Box::new(DonePayload {
            latency_ms: 0,
            provider: hit.provider,
            model: hit.model,
            text: hit.text,
            usage: hit.usage,
            citations: hit.citations,
            estimated_cost_usd: Some(0.0),
            cached: true,
        }))
    }

    async fn finish_success(
        &self,
        task: &PreparedTask,
        spec: ModelSpec,
        attempts: u32,
        text: String,
        usage: Option<Usage>,
    ) -> TaskEvent {
        let latency_ms = task.elapsed_ms();
        let cost = estimate_cost(&spec, usage.as_ref());

        self.limiter
            .record(&task.client_id, &task.kind, cost.unwrap_or(0.0))
            .await;

        info!(
            kind = %task.kind,
            provider = %spec.provider,
            model = %spec.model,
            cost_tier = %task.cost_tier,
            latency_ms,
            total_tokens = usage.map(|u| u.total_tokens),
            cost_usd = cost.unwrap_or(0.0),
            attempts,
            "ai_task completed"
        );

        if let Some(slot) = &task.cache {
            let stored = self.cache.put(
                slot.key.clone(),
                CachedResponse {
                    text: text.clone(),
                    provider: spec.provider,
                    model: spec.model.clone(),
                    usage,
                    citations: task.citations.clone(),
                },
                slot.ttl,
            );
            if stored {
                debug!(kind = %task.kind, ttl_secs = slot.ttl.as_secs(), "Cached response");
            }
        }

        self.telemetry.record(TaskOutcome {
            latency_ms,
            ..task.success_outcome(&spec, attempts, usage, cost)
        });

        TaskEvent::Done(Box::new(DonePayload {
            latency_ms,
            provider: spec.provider,
            model: spec.model,
            text,
            usage,
            citations: task.citations.clone(),
            estimated_cost_usd: cost,
            cached: false,
        }))
    }

    fn finish_error(
        &self,
        task: &PreparedTask,
        spec: ModelSpec,
        attempts: u32,
        failure: TaskFailure,
        detail: ErrorDetail,
    ) -> TaskEvent {
        let message = user_message(&failure);

        self.telemetry.record(TaskOutcome {
            error: Some(failure.message.clone()),
            error_type: Some(detail.kind),
            retryable: Some(detail.retryable),
            ..task.outcome(OutcomeStatus::Error, &spec, attempts)
        });

        TaskEvent::Error(ErrorPayload {
            message,
            kind: detail.kind,
            retryable: detail.retryable,
            provider: spec.provider,
            model: spec.model,
        })
    }
}

impl std::fmt::Debug for TaskOrchestrator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TaskOrchestrator")
            .field("registry", &self.registry)
            .field("retry", &self.retry)
            .field("budget", &self.budget)
            .field("attempt_timeout", &self.attempt_timeout)
            .field("cache_entries", &self.cache.len())
            .finish()
    }
}
