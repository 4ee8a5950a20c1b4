//! Unified provider error type
//!
//! One error type for every backend family. Wire clients mostly report
//! failures as terminal error chunks; this type covers failures raised before
//! or outside a chunk stream.
//!
//! | Variant | HTTP Status | Retryable |
//! |------|------------|--------|
//! | Authentication | 401 | No |
//! | RateLimit | 429 | Yes |
//! | QuotaExceeded | 402 | No |
//! | ModelNotFound | 404 | No |
//! | InvalidRequest | 400 | No |
//! | Network | 503 | Yes |
//! | Timeout | 408 | Yes |
//! | ProviderUnavailable | 503 | Yes |
//! | ApiError | status | 429 and 5xx |
//! | Other | 500 | undecided |

/// Unified provider error type
#[derive(Debug, Clone, thiserror::Error)]
pub enum ProviderError {
    #[error("Authentication failed for {provider}: {message}")]
    Authentication {
        provider: &'static str,
        message: String,
    },

    #[error("Rate limit exceeded for {provider}: {message}")]
    RateLimit {
        provider: &'static str,
        message: String,
        retry_after: Option<u64>,
    },

    #[error("Quota exceeded for {provider}: {message}")]
    QuotaExceeded {
        provider: &'static str,
        message: String,
    },

    #[error("Model '{model}' not found for {provider}")]
    ModelNotFound {
        provider: &'static str,
        model: String,
    },

    #[error("Invalid request for {provider}: {message}")]
    InvalidRequest {
        provider: &'static str,
        message: String,
    },

    #[error("Network error for {provider}: {message}")]
    Network {
        provider: &'static str,
        message: String,
    },

    #[error("Provider {provider} is unavailable: {message}")]
    ProviderUnavailable {
        provider: &'static str,
        message: String,
    },

    #[error("Configuration error for {provider}: {message}")]
    Configuration {
        provider: &'static str,
        message: String,
    },

    #[error("Timeout for {provider}: {message}")]
    Timeout {
        provider: &'static str,
        message: String,
    },

    #[error("API error for {provider} (status {status}): {message}")]
    ApiError {
        provider: &'static str,
        status: u16,
        message: String,
        /// Raw upstream body, kept for logging only
        body: Option<String>,
    },

    #[error("Failed to parse {provider} response: {message}")]
    ResponseParsing {
        provider: &'static str,
        message: String,
    },

    #[error("{provider} error: {message}")]
    Other {
        provider: &'static str,
        message: String,
    },
}

impl ProviderError {
    /// Create authentication error
    pub fn authentication(provider: &'static str, message: impl Into<String>) -> Self {
        Self::Authentication {
            provider,
            message: message.into(),
        }
    }

    /// Create rate limit error
    pub fn rate_limit(provider: &'static str, retry_after: Option<u64>) -> Self {
        Self::RateLimit {
            provider,
            message: match retry_after {
                Some(seconds) => format!("Rate limit exceeded. Retry after {} seconds", seconds),
                None => "Rate limit exceeded".to_string(),
            },
            retry_after,
        }
    }

    /// Create quota exceeded error
    pub fn quota_exceeded(provider: &'static str, message: impl Into<String>) -> Self {
        Self::QuotaExceeded {
            provider,
            message: message.into(),
        }
    }

    /// Create model not found error
    pub fn model_not_found(provider: &'static str, model: impl Into<String>) -> Self {
        Self::ModelNotFound {
            provider,
            model: model.into(),
        }
    }

    /// Create invalid request error
    pub fn invalid_request(provider: &'static str, message: impl Into<String>) -> Self {
        Self::InvalidRequest {
            provider,
            message: message.into(),
        }
    }

    /// Create network error
    pub fn network(provider: &'static str, message: impl Into<String>) -> Self {
        Self::Network {
            provider,
            message: message.into(),
        }
    }

    /// Create provider unavailable error
    pub fn provider_unavailable(provider: &'static str, message: impl Into<String>) -> Self {
        Self::ProviderUnavailable {
            provider,
            message: message.into(),
        }
    }

    /// Create configuration error
    pub fn configuration(provider: &'static str, message: impl Into<String>) -> Self {
        Self::Configuration {
            provider,
            message: message.into(),
        }
    }

    /// Create timeout error
    pub fn timeout(provider: &'static str, message: impl Into<String>) -> Self {
        Self::Timeout {
            provider,
            message: message.into(),
        }
    }

    /// Create API error with status code
    pub fn api_error(provider: &'static str, status: u16, message: impl Into<String>) -> Self {
        Self::ApiError {
            provider,
            status,
            message: message.into(),
            body: None,
        }
    }

    /// Create API error carrying the upstream body
    pub fn api_error_with_body(
        provider: &'static str,
        status: u16,
        message: impl Into<String>,
        body: impl Into<String>,
    ) -> Self {
        Self::ApiError {
            provider,
            status,
            message: message.into(),
            body: Some(body.into()),
        }
    }

    /// Create response parsing error
    pub fn response_parsing(provider: &'static str, message: impl Into<String>) -> Self {
        Self::ResponseParsing {
            provider,
            message: message.into(),
        }
    }

    /// Create other error
    pub fn other(provider: &'static str, message: impl Into<String>) -> Self {
        Self::Other {
            provider,
            message: message.into(),
        }
    }

    /// Map a reqwest transport error
    pub fn from_reqwest(provider: &'static str, err: &reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::timeout(provider, "Request timed out")
        } else if err.is_connect() {
            Self::network(provider, format!("Connection error: {}", err))
        } else if let Some(status) = err.status() {
            Self::api_error(provider, status.as_u16(), err.to_string())
        } else {
            Self::network(provider, err.to_string())
        }
    }

    /// Get the provider name that caused this error
    pub fn provider(&self) -> &'static str {
        match self {
            Self::Authentication { provider, .. }
            | Self::RateLimit { provider, .. }
            | Self::QuotaExceeded { provider, .. }
            | Self::ModelNotFound { provider, .. }
            | Self::InvalidRequest { provider, .. }
            | Self::Network { provider, .. }
            | Self::ProviderUnavailable { provider, .. }
            | Self::Configuration { provider, .. }
            | Self::Timeout { provider, .. }
            | Self::ApiError { provider, .. }
            | Self::ResponseParsing { provider, .. }
            | Self::Other { provider, .. } => provider,
        }
    }

    /// Explicit retry decision carried by the variant
    ///
    /// `None` leaves the decision to message and status inspection.
    pub fn retry_hint(&self) -> Option<bool> {
        match self {
            Self::Network { .. }
            | Self::Timeout { .. }
            | Self::RateLimit { .. }
            | Self::ProviderUnavailable { .. } => Some(true),

            Self::Authentication { .. }
            | Self::QuotaExceeded { .. }
            | Self::ModelNotFound { .. }
            | Self::InvalidRequest { .. }
            | Self::Configuration { .. }
            | Self::ResponseParsing { .. } => Some(false),

            // Decided by status table / message
            Self::ApiError { .. } | Self::Other { .. } => None,
        }
    }

    /// Check if this error is retryable
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::ApiError { status, .. } => matches!(*status, 429 | 500..=599),
            other => other.retry_hint().unwrap_or(false),
        }
    }

    /// Get HTTP status code for this error
    pub fn http_status(&self) -> Option<u16> {
        match self {
            Self::Authentication { .. } => Some(401),
            Self::RateLimit { .. } => Some(429),
            Self::QuotaExceeded { .. } => Some(402),
            Self::ModelNotFound { .. } => Some(404),
            Self::InvalidRequest { .. } => Some(400),
            Self::Timeout { .. } => Some(408),
            Self::ProviderUnavailable { .. } => Some(503),
            Self::ApiError { status, .. } => Some(*status),
            Self::Network { .. }
            | Self::Configuration { .. }
            | Self::ResponseParsing { .. }
            | Self::Other { .. } => None,
        }
    }

    /// Upstream response body, if one was captured
    pub fn response_body(&self) -> Option<&str> {
        match self {
            Self::ApiError { body, .. } => body.as_deref(),
            _ => None,
        }
    }
}
