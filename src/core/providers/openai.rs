//! OpenAI-compatible streaming client
//!
//! `POST {base}/chat/completions` with `stream: true`. Content arrives as
//! `choices[0].delta.content`; usage comes in a trailing chunk when
//! `stream_options.include_usage` is set.

use futures::StreamExt;
use serde_json::{Value, json};
use std::time::Duration;
use tracing::{debug, warn};

use super::sse::{LineBuffer, SseLine, error_message_from_body};
use super::{ChunkStream, ProviderError, ProviderRequest};
use crate::config::models::provider::ProviderConfig;
use crate::core::types::{ProviderKind, StreamChunk, Usage};

const PROVIDER: &str = "openai";

/// OpenAI chat completions client
#[derive(Debug, Clone)]
pub struct OpenAIClient {
    http: reqwest::Client,
    api_key: Option<String>,
    base_url: String,
}

impl OpenAIClient {
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

    fn request_body(request: &ProviderRequest) -> Value {
        json!({
            "model": request.model,
            "messages": request.messages,
            "temperature": request.temperature,
            "max_tokens": request.max_tokens,
            "stream": true,
            "stream_options": { "include_usage": true },
        })
    }

    pub async fn stream(&self, request: ProviderRequest) -> Result<ChunkStream, ProviderError> {
        let Some(api_key) = self.api_key.clone() else {
            return Ok(super::single_error(format!(
                "{} API key not configured",
                ProviderKind::OpenAI.display_name()
            )));
        };

        let url = format!("{}/chat/completions", self.base_url);
        let body = Self::request_body(&request);
        let http = self.http.clone();

        let stream = async_stream::stream! {
            let response = match http
                .post(&url)
                .bearer_auth(&api_key)
                .json(&body)
                .send()
                .await
            {
                Ok(response) => response,
                Err(e) => {
                    yield Ok(super::transport_error_chunk(ProviderKind::OpenAI, &e));
                    return;
                }
            };

            let status = response.status();
            if !status.is_success() {
                let text = response.text().await.unwrap_or_default();
                warn!(status = status.as_u16(), body = %crate::utils::truncate_chars(&text, 500), "OpenAI request failed");
                yield Ok(StreamChunk::error(
                    format!("OpenAI error: {}", error_message_from_body(&text)),
                    Some(status.as_u16()),
                ));
                return;
            }

            let mut bytes = response.bytes_stream();
            let mut lines = LineBuffer::new();
            let mut usage: Option<Usage> = None;

            let mut ended = false;
            while !ended {
                let batch = match bytes.next().await {
                    Some(Ok(chunk)) => lines.push(&chunk),
                    Some(Err(e)) => {
                        yield Ok(super::transport_error_chunk(ProviderKind::OpenAI, &e));
                        return;
                    }
                    // A last line without a terminator still carries content
                    None => {
                        ended = true;
                        lines.finish().into_iter().collect()
                    }
                };

                for line in batch {
                    match SseLine::parse(&line) {
                        SseLine::Done => {
                            yield Ok(StreamChunk::done(usage));
                            return;
                        }
                        SseLine::Data(data) => match parse_chunk(data) {
                            Ok(ParsedChunk { text, usage: chunk_usage, error }) => {
                                if let Some(error) = error {
                                    yield Ok(StreamChunk::error(format!("OpenAI error: {}", error), None));
                                    return;
                                }
                                if chunk_usage.is_some() {
                                    usage = chunk_usage;
                                }
                                if !text.is_empty() {
                                    yield Ok(StreamChunk::text(text));
                                }
                            }
                            Err(e) => debug!(error = %e, "Skipping malformed OpenAI chunk"),
                        },
                        SseLine::Event(_) | SseLine::Ignored => {}
                    }
                }
            }

            // Body ended without [DONE]
            yield Ok(StreamChunk::done(usage));
        };

        Ok(Box::pin(stream))
    }
}

#[derive(Debug, Default)]
struct ParsedChunk {
    text: String,
    usage: Option<Usage>,
    error: Option<String>,
}

fn parse_chunk(data: &str) -> Result<ParsedChunk, serde_json::Error> {
    let json: Value = serde_json::from_str(data)?;

    let error = json
        .get("error")
        .map(|e| e.get("message").and_then(|m| m.as_str()).unwrap_or("stream error").to_string());

    let text = json
        .get("choices")
        .and_then(|c| c.get(0))
        .and_then(|c| c.get("delta"))
        .and_then(|d| d.get("content"))
        .and_then(|c| c.as_str())
        .unwrap_or_default()
        .to_string();

    let usage = json.get("usage").filter(|u| !u.is_null()).map(|u| {
        let prompt = u.get("prompt_tokens").and_then(|v| v.as_u64()).unwrap_or(0) as u32;
        let completion = u.get("completion_tokens").and_then(|v| v.as_u64()).unwrap_or(0) as u32;
        let total = u
            .get("total_tokens")
            .and_then(|v| v.as_u64())
            .map(|t| t as u32)
            .unwrap_or(prompt + completion);
        Usage {
            prompt_tokens: prompt,
            completion_tokens: completion,
            total_tokens: total,
        }
    });

    Ok(ParsedChunk { text, usage, error })
}
