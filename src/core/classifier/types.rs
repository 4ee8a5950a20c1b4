//! Failure and detail types

use serde::{Deserialize, Serialize};

use crate::core::providers::ProviderError;
use crate::core::types::StreamChunk;

/// Coarse category of a failure, reported as the detail's `type`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    Timeout,
    Network,
    RateLimit,
    Authentication,
    QuotaExceeded,
    InvalidRequest,
    ServiceUnavailable,
    UpstreamError,
    ProviderError,
    Internal,
}

impl FailureKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            FailureKind::Timeout => "timeout",
            FailureKind::Network => "network",
            FailureKind::RateLimit => "rate_limit",
            FailureKind::Authentication => "authentication",
            FailureKind::QuotaExceeded => "quota_exceeded",
            FailureKind::InvalidRequest => "invalid_request",
            FailureKind::ServiceUnavailable => "service_unavailable",
            FailureKind::UpstreamError => "upstream_error",
            FailureKind::ProviderError => "provider_error",
            FailureKind::Internal => "internal",
        }
    }

    /// Best-effort category for an untyped failure
    pub fn infer(message: &str, status: Option<u16>) -> Self {
        match status {
            Some(401 | 403) => return FailureKind::Authentication,
            Some(402) => return FailureKind::QuotaExceeded,
            Some(408) => return FailureKind::Timeout,
            Some(429) => return FailureKind::RateLimit,
            Some(502..=504) => return FailureKind::ServiceUnavailable,
            Some(500..=599) => return FailureKind::UpstreamError,
            Some(400..=499) => return FailureKind::InvalidRequest,
            _ => {}
        }

        let lower = message.to_lowercase();
        if lower.contains("timed out") || lower.contains("timeout") {
            FailureKind::Timeout
        } else if lower.contains("connection") || lower.contains("network") {
            FailureKind::Network
        } else {
            FailureKind::ProviderError
        }
    }
}

impl std::fmt::Display for FailureKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One failed attempt, as seen by the classifier
#[derive(Debug, Clone, PartialEq)]
pub struct TaskFailure {
    pub kind: FailureKind,
    pub message: String,
    pub status_code: Option<u16>,
    pub response_body: Option<String>,
    /// Explicit retry tag set by the producer; overrides every other rule
    pub retry_hint: Option<bool>,
}

impl TaskFailure {
    /// Untyped failure; kind is inferred from message and status
    pub fn new(message: impl Into<String>, status_code: Option<u16>) -> Self {
        let message = message.into();
        Self {
            kind: FailureKind::infer(&message, status_code),
            message,
            status_code,
            response_body: None,
            retry_hint: None,
        }
    }

    pub fn with_kind(mut self, kind: FailureKind) -> Self {
        self.kind = kind;
        self
    }

    pub fn with_body(mut self, body: impl Into<String>) -> Self {
        self.response_body = Some(body.into());
        self
    }

    /// Tag as retryable regardless of message content
    pub fn retryable(mut self) -> Self {
        self.retry_hint = Some(true);
        self
    }

    /// Tag as never retryable regardless of message content
    pub fn non_retryable(mut self) -> Self {
        self.retry_hint = Some(false);
        self
    }

    /// Per-attempt deadline expired
    pub fn timeout(provider: &str) -> Self {
        Self::new(format!("{} request timed out", provider), None)
            .with_kind(FailureKind::Timeout)
            .retryable()
    }

    /// Failure reported in-band by a terminal chunk
    pub fn from_chunk(chunk: &StreamChunk) -> Self {
        Self::new(chunk.error.clone().unwrap_or_default(), chunk.status)
    }
}

impl From<&ProviderError> for TaskFailure {
    fn from(err: &ProviderError) -> Self {
        let kind = match err {
            ProviderError::Authentication { .. } => FailureKind::Authentication,
            ProviderError::RateLimit { .. } => FailureKind::RateLimit,
            ProviderError::QuotaExceeded { .. } => FailureKind::QuotaExceeded,
            ProviderError::ModelNotFound { .. } | ProviderError::InvalidRequest { .. } => {
                FailureKind::InvalidRequest
            }
            ProviderError::Network { .. } => FailureKind::Network,
            ProviderError::ProviderUnavailable { .. } => FailureKind::ServiceUnavailable,
            ProviderError::Timeout { .. } => FailureKind::Timeout,
            ProviderError::Configuration { .. } | ProviderError::ResponseParsing { .. } => {
                FailureKind::Internal
            }
            ProviderError::ApiError { status, .. } => {
                FailureKind::infer(&err.to_string(), Some(*status))
            }
            ProviderError::Other { .. } => FailureKind::infer(&err.to_string(), None),
        };

        Self {
            kind,
            message: err.to_string(),
            status_code: err.http_status(),
            response_body: err.response_body().map(str::to_string),
            retry_hint: err.retry_hint(),
        }
    }
}

impl From<ProviderError> for TaskFailure {
    fn from(err: ProviderError) -> Self {
        TaskFailure::from(&err)
    }
}

/// Structured classification result
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorDetail {
    #[serde(rename = "type")]
    pub kind: FailureKind,
    pub message: String,
    pub retryable: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status_code: Option<u16>,
    /// Upstream body, at most 500 characters
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response_body: Option<String>,
}
