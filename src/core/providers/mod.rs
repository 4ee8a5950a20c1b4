//! Provider clients using an enum-based design
//!
//! Every backend family produces the same thing: a lazy sequence of
//! normalized [`StreamChunk`]s. The [`Provider`] enum dispatches on the
//! provider tag of a [`ModelSpec`](crate::core::types::ModelSpec).

pub mod anthropic;
pub mod error;
pub mod ollama;
pub mod openai;
pub mod registry;
pub mod sse;

use async_trait::async_trait;
use futures::Stream;
use std::pin::Pin;
use std::sync::Arc;

use crate::config::models::provider::ProviderConfig;
use crate::core::types::{ChatMessage, ProviderKind, StreamChunk};

pub use anthropic::AnthropicClient;
pub use error::ProviderError;
pub use ollama::OllamaClient;
pub use openai::OpenAIClient;
pub use registry::ProviderRegistry;

/// Stream of normalized chunks from one provider attempt
pub type ChunkStream = Pin<Box<dyn Stream<Item = Result<StreamChunk, ProviderError>> + Send>>;

/// One call to a provider
#[derive(Debug, Clone, PartialEq)]
pub struct ProviderRequest {
    pub messages: Vec<ChatMessage>,
    pub model: String,
    pub temperature: f32,
    pub max_tokens: u32,
}

/// Pluggable chunk source, used for backends outside the built-in families
#[async_trait]
pub trait StreamingProvider: Send + Sync + std::fmt::Debug {
    /// Start streaming a completion
    ///
    /// Failures may be raised here, yielded as `Err` items, or reported as a
    /// terminal chunk carrying `error`; callers treat all three alike.
    async fn stream(&self, request: ProviderRequest) -> Result<ChunkStream, ProviderError>;

    /// Whether the backend can currently accept requests
    async fn is_available(&self) -> bool {
        true
    }
}

/// Unified provider enum
#[derive(Debug, Clone)]
pub enum Provider {
    OpenAI(OpenAIClient),
    Anthropic(AnthropicClient),
    Ollama(OllamaClient),
    /// Externally supplied implementation serving one provider family
    Custom {
        kind: ProviderKind,
        source: Arc<dyn StreamingProvider>,
    },
}

/// Dispatch an async method to the wrapped client
macro_rules! dispatch_provider_async {
    ($self:expr, $method:ident $(, $arg:expr)*) => {
        match $self {
            Provider::OpenAI(p) => p.$method($($arg),*).await,
            Provider::Anthropic(p) => p.$method($($arg),*).await,
            Provider::Ollama(p) => p.$method($($arg),*).await,
            Provider::Custom { source, .. } => source.$method($($arg),*).await,
        }
    };
}

impl Provider {
    /// Build the built-in client for a configured provider
    pub fn from_config(config: &ProviderConfig) -> Result<Self, ProviderError> {
        Ok(match config.kind {
            ProviderKind::OpenAI => Provider::OpenAI(OpenAIClient::new(config)?),
            ProviderKind::Anthropic => Provider::Anthropic(AnthropicClient::new(config)?),
            ProviderKind::Ollama => Provider::Ollama(OllamaClient::new(config)?),
        })
    }

    /// Wrap a custom chunk source
    pub fn custom(kind: ProviderKind, source: Arc<dyn StreamingProvider>) -> Self {
        Provider::Custom { kind, source }
    }

    /// Provider family this client serves
    pub fn kind(&self) -> ProviderKind {
        match self {
            Provider::OpenAI(_) => ProviderKind::OpenAI,
            Provider::Anthropic(_) => ProviderKind::Anthropic,
            Provider::Ollama(_) => ProviderKind::Ollama,
            Provider::Custom { kind, .. } => *kind,
        }
    }

    pub async fn stream(&self, request: ProviderRequest) -> Result<ChunkStream, ProviderError> {
        dispatch_provider_async!(self, stream, request)
    }

    pub async fn is_available(&self) -> bool {
        dispatch_provider_async!(self, is_available)
    }
}

/// A stream holding a single terminal error chunk
pub(crate) fn single_error(message: String) -> ChunkStream {
    Box::pin(futures::stream::iter(vec![Ok(StreamChunk::error(
        message, None,
    ))]))
}

/// Terminal chunk for a transport-level reqwest failure
pub(crate) fn transport_error_chunk(kind: ProviderKind, err: &reqwest::Error) -> StreamChunk {
    if err.is_timeout() {
        tracing::error!(provider = %kind, "Provider request timed out");
        return StreamChunk::error("Request timed out", None);
    }
    tracing::error!(provider = %kind, error = %err, "Provider streaming error");
    if err.is_connect() {
        StreamChunk::error(
            format!("{} connection error: {}", kind.display_name(), err),
            None,
        )
    } else {
        StreamChunk::error(
            format!("{} error: {}", kind.display_name(), err),
            err.status().map(|s| s.as_u16()),
        )
    }
}
