//! Anthropic Messages API streaming client

use futures::StreamExt;
use serde_json::{Value, json};
use std::time::Duration;
use tracing::{debug, warn};

use super::sse::{LineBuffer, SseLine, error_message_from_body};
use super::{ChunkStream, ProviderError, ProviderRequest};
use crate::config::models::provider::ProviderConfig;
use crate::core::types::{MessageRole, ProviderKind, StreamChunk, Usage};

const PROVIDER: &str = "anthropic";
const ANTHROPIC_VERSION: &str = "2023-06-01";

/// Anthropic streaming client
#[derive(Debug, Clone)]
pub struct AnthropicClient {
    http: reqwest::Client,
    api_key: Option<String>,
    base_url: String,
}

/// Stream events this client reacts to
#[derive(Debug, Clone, PartialEq)]
enum AnthropicEvent {
    MessageStart(Value),
    ContentBlockDelta(String),
    MessageDelta(Value),
    MessageStop,
    Error(String),
    Other,
}

impl AnthropicEvent {
    fn parse(data: &str) -> Option<Self> {
        let json: Value = serde_json::from_str(data).ok()?;
        let event = match json.get("type").and_then(|t| t.as_str()).unwrap_or("") {
            "message_start" => AnthropicEvent::MessageStart(
                json.get("message")
                    .and_then(|m| m.get("usage"))
                    .cloned()
                    .unwrap_or(Value::Null),
            ),
            "content_block_delta" => AnthropicEvent::ContentBlockDelta(
                json.get("delta")
                    .and_then(|d| d.get("text"))
                    .and_then(|t| t.as_str())
                    .unwrap_or_default()
                    .to_string(),
            ),
            "message_delta" => {
                AnthropicEvent::MessageDelta(json.get("usage").cloned().unwrap_or(Value::Null))
            }
            "message_stop" => AnthropicEvent::MessageStop,
            "error" => AnthropicEvent::Error(
                json.get("error")
                    .and_then(|e| e.get("message"))
                    .and_then(|m| m.as_str())
                    .unwrap_or("stream error")
                    .to_string(),
            ),
            _ => AnthropicEvent::Other,
        };
        Some(event)
    }
}

fn token_count(value: &Value, field: &str) -> Option<u32> {
    value.get(field).and_then(|v| v.as_u64()).map(|v| v as u32)
}

impl AnthropicClient {
    pub fn new(config: &ProviderConfig) -> Result<Self, ProviderError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| ProviderError::configuration(PROVIDER, e.to_string()))?;

        Ok(Self {
            http,
            api_key: config.api_key.clone().filter(|k| !k.trim().is_empty()),
            base_url: config.base_url().trim_end_matches('/').to_string(),
        })
    }

    /// Available iff an API key is configured
    pub async fn is_available(&self) -> bool {
        self.api_key.is_some()
    }

    /// System messages are lifted into the top-level `system` field
    fn request_body(request: &ProviderRequest) -> Value {
        let system: Vec<&str> = request
            .messages
            .iter()
            .filter(|m| m.role == MessageRole::System)
            .map(|m| m.content.as_str())
            .collect();

        let messages: Vec<Value> = request
            .messages
            .iter()
            .filter(|m| m.role != MessageRole::System)
            .map(|m| json!({ "role": m.role.to_string(), "content": m.content }))
            .collect();

        let mut body = json!({
            "model": request.model,
            "messages": messages,
            "temperature": request.temperature,
            "max_tokens": request.max_tokens,
            "stream": true,
        });
        if !system.is_empty() {
            body["system"] = json!(system.join("\n\n"));
        }
        body
    }

    pub async fn stream(&self, request: ProviderRequest) -> Result<ChunkStream, ProviderError> {
        let Some(api_key) = self.api_key.clone() else {
            return Ok(super::single_error(format!(
                "{} API key not configured",
                ProviderKind::Anthropic.display_name()
            )));
        };

        let url = format!("{}/messages", self.base_url);
        let body = Self::request_body(&request);
        let http = self.http.clone();

        let stream = async_stream::stream! {
            let response = match http
                .post(&url)
                .header("x-api-key", api_key.as_str())
                .header("anthropic-version", ANTHROPIC_VERSION)
                .json(&body)
                .send()
                .await
            {
                Ok(response) => response,
                Err(e) => {
                    yield Ok(super::transport_error_chunk(ProviderKind::Anthropic, &e));
                    return;
                }
            };

            let status = response.status();
            if !status.is_success() {
                let text = response.text().await.unwrap_or_default();
                warn!(status = status.as_u16(), body = %crate::utils::truncate_chars(&text, 500), "Anthropic request failed");
                yield Ok(StreamChunk::error(
                    format!("Anthropic error: {}", error_message_from_body(&text)),
                    Some(status.as_u16()),
                ));
                return;
            }

            let mut bytes = response.bytes_stream();
            let mut lines = LineBuffer::new();
            let mut prompt_tokens: Option<u32> = None;
            let mut completion_tokens: Option<u32> = None;

            let mut ended = false;
            while !ended {
                let batch = match bytes.next().await {
                    Some(Ok(chunk)) => lines.push(&chunk),
                    Some(Err(e)) => {
                        yield Ok(super::transport_error_chunk(ProviderKind::Anthropic, &e));
                        return;
                    }
                    // A last line without a terminator still carries content
                    None => {
                        ended = true;
                        lines.finish().into_iter().collect()
                    }
                };

                for line in batch {
                    let data = match SseLine::parse(&line) {
                        SseLine::Data(data) => data,
                        _ => continue,
                    };
                    let Some(event) = AnthropicEvent::parse(data) else {
                        debug!("Skipping malformed Anthropic event");
                        continue;
                    };

                    match event {
                        AnthropicEvent::MessageStart(usage) => {
                            prompt_tokens = token_count(&usage, "input_tokens").or(prompt_tokens);
                            completion_tokens = token_count(&usage, "output_tokens").or(completion_tokens);
                        }
                        AnthropicEvent::ContentBlockDelta(text) => {
                            if !text.is_empty() {
                                yield Ok(StreamChunk::text(text));
                            }
                        }
                        AnthropicEvent::MessageDelta(usage) => {
                            completion_tokens = token_count(&usage, "output_tokens").or(completion_tokens);
                        }
                        AnthropicEvent::MessageStop => {
                            yield Ok(StreamChunk::done(usage_from(prompt_tokens, completion_tokens)));
                            return;
                        }
                        AnthropicEvent::Error(message) => {
                            yield Ok(StreamChunk::error(format!("Anthropic error: {}", message), None));
                            return;
                        }
                        AnthropicEvent::Other => {}
                    }
                }
            }

            yield Ok(StreamChunk::done(usage_from(prompt_tokens, completion_tokens)));
        };

        Ok(Box::pin(stream))
    }
}

fn usage_from(prompt: Option<u32>, completion: Option<u32>) -> Option<Usage> {
    if prompt.is_none() && completion.is_none() {
        return None;
    }
    Some(Usage::new(prompt.unwrap_or(0), completion.unwrap_or(0)))
}
