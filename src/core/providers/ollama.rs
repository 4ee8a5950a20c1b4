//! Ollama local model client (NDJSON `/api/generate`)

use futures::StreamExt;
use serde_json::{Value, json};
use std::time::Duration;
use tracing::{debug, warn};

use super::sse::{LineBuffer, error_message_from_body};
use super::{ChunkStream, ProviderError, ProviderRequest};
use crate::config::models::provider::ProviderConfig;
use crate::core::types::{MessageRole, ProviderKind, StreamChunk, Usage};

const PROVIDER: &str = "ollama";
const AVAILABILITY_TIMEOUT: Duration = Duration::from_secs(5);

/// Ollama streaming client
#[derive(Debug, Clone)]
pub struct OllamaClient {
    http: reqwest::Client,
    base_url: String,
}

/// Progress of one generate call
#[derive(Debug, Default)]
struct GenerateState {
    prompt_tokens: u32,
    completion_tokens: u32,
}

impl GenerateState {
    fn usage(&self) -> Option<Usage> {
        Some(Usage::new(self.prompt_tokens, self.completion_tokens))
    }

    /// Apply one NDJSON line; returns the chunk to forward, if any
    fn apply(&mut self, line: &str) -> Option<StreamChunk> {
        let data: Value = match serde_json::from_str(line) {
            Ok(data) => data,
            Err(_) => {
                debug!("Skipping malformed Ollama line");
                return None;
            }
        };

        if let Some(error) = data.get("error").and_then(|e| e.as_str()) {
            return Some(StreamChunk::error(format!("Ollama error: {}", error), None));
        }
        if let Some(count) = data.get("prompt_eval_count").and_then(|v| v.as_u64()) {
            self.prompt_tokens = count as u32;
        }
        if let Some(count) = data.get("eval_count").and_then(|v| v.as_u64()) {
            self.completion_tokens = count as u32;
        }

        if data.get("done").and_then(|d| d.as_bool()).unwrap_or(false) {
            return Some(StreamChunk::done(self.usage()));
        }

        data.get("response")
            .and_then(|r| r.as_str())
            .filter(|r| !r.is_empty())
            .map(StreamChunk::text)
    }
}

impl OllamaClient {
    pub fn new(config: &ProviderConfig) -> Result<Self, ProviderError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| ProviderError::configuration(PROVIDER, e.to_string()))?;

        Ok(Self {
            http,
            base_url: config.base_url().trim_end_matches('/').to_string(),
        })
    }

    /// Available iff `GET /api/tags` answers successfully within 5 seconds
    pub async fn is_available(&self) -> bool {
        match self
            .http
            .get(format!("{}/api/tags", self.base_url))
            .timeout(AVAILABILITY_TIMEOUT)
            .send()
            .await
        {
            Ok(response) => response.status().is_success(),
            Err(e) => {
                debug!(error = %e, "Ollama availability check failed");
                false
            }
        }
    }

    /// System and user messages are folded into a single prompt
    fn build_prompt(request: &ProviderRequest) -> String {
        let collect = |role: MessageRole| -> Vec<&str> {
            request
                .messages
                .iter()
                .filter(|m| m.role == role)
                .map(|m| m.content.as_str())
                .collect()
        };
        let system = collect(MessageRole::System);
        let user = collect(MessageRole::User);

        let mut parts = Vec::new();
        if !system.is_empty() {
            parts.push(format!("System:\n{}", system.join("\n")));
        }
        if !user.is_empty() {
            parts.push(format!("User:\n{}", user.join("\n")));
        }
        parts.join("\n\n")
    }

    pub async fn stream(&self, request: ProviderRequest) -> Result<ChunkStream, ProviderError> {
        let url = format!("{}/api/generate", self.base_url);
        let body = json!({
            "model": request.model,
            "prompt": Self::build_prompt(&request),
            "stream": true,
            "options": {
                "temperature": request.temperature,
                "num_predict": request.max_tokens,
            },
        });
        let http = self.http.clone();

        let stream = async_stream::stream! {
            let response = match http.post(&url).json(&body).send().await {
                Ok(response) => response,
                Err(e) => {
                    yield Ok(super::transport_error_chunk(ProviderKind::Ollama, &e));
                    return;
                }
            };

            let status = response.status();
            if !status.is_success() {
                let text = response.text().await.unwrap_or_default();
                warn!(status = status.as_u16(), body = %crate::utils::truncate_chars(&text, 500), "Ollama request failed");
                yield Ok(StreamChunk::error(
                    format!("Ollama error: {}", error_message_from_body(&text)),
                    Some(status.as_u16()),
                ));
                return;
            }

            let mut bytes = response.bytes_stream();
            let mut lines = LineBuffer::new();
            let mut state = GenerateState::default();

            while let Some(next) = bytes.next().await {
                let chunk = match next {
                    Ok(chunk) => chunk,
                    Err(e) => {
                        yield Ok(super::transport_error_chunk(ProviderKind::Ollama, &e));
                        return;
                    }
                };

                for line in lines.push(&chunk) {
                    if line.is_empty() {
                        continue;
                    }
                    if let Some(out) = state.apply(&line) {
                        let terminal = out.done;
                        yield Ok(out);
                        if terminal {
                            return;
                        }
                    }
                }
            }

            if let Some(line) = lines.finish() {
                if let Some(out) = state.apply(&line) {
                    let terminal = out.done;
                    yield Ok(out);
                    if terminal {
                        return;
                    }
                }
            }

            yield Ok(StreamChunk::done(state.usage()));
        };

        Ok(Box::pin(stream))
    }
}
