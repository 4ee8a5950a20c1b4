//! Streaming and completed response types

use super::model::ProviderKind;
use serde::{Deserialize, Serialize};

/// Token usage statistics
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Usage {
    /// Prompt token count
    pub prompt_tokens: u32,
    /// Completion token count
    pub completion_tokens: u32,
    /// Total token count
    pub total_tokens: u32,
}

impl Usage {
    pub fn new(prompt_tokens: u32, completion_tokens: u32) -> Self {
        Self {
            prompt_tokens,
            completion_tokens,
            total_tokens: prompt_tokens + completion_tokens,
        }
    }
}

/// Normalized unit flowing from a provider client to the orchestrator
///
/// A provider emits zero or more non-terminal chunks followed by exactly one
/// terminal chunk (`done == true`). Usage is only guaranteed on the terminal one.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StreamChunk {
    pub text: String,
    pub done: bool,
    pub error: Option<String>,
    /// HTTP status of the upstream failure, when known
    pub status: Option<u16>,
    pub usage: Option<Usage>,
}

impl StreamChunk {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Default::default()
        }
    }

    pub fn done(usage: Option<Usage>) -> Self {
        Self {
            done: true,
            usage,
            ..Default::default()
        }
    }

    pub fn error(message: impl Into<String>, status: Option<u16>) -> Self {
        Self {
            done: true,
            error: Some(message.into()),
            status,
            ..Default::default()
        }
    }

    /// True when this chunk carries a non-empty error
    pub fn is_error(&self) -> bool {
        self.error.as_deref().is_some_and(|e| !e.is_empty())
    }
}

/// Search citation attached to a response
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Citation {
    pub index: usize,
    pub title: String,
    pub url: Option<String>,
    pub snippet: Option<String>,
    pub source: Option<String>,
}

/// Completed response payload stored in the response cache
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CachedResponse {
    pub text: String,
    pub provider: ProviderKind,
    pub model: String,
    pub usage: Option<Usage>,
    #[serde(default)]
    pub citations: Vec<Citation>,
}
