//! Classification rules

use super::types::{ErrorDetail, FailureKind, TaskFailure};

/// Lowercased substrings that mark a failure as transient
const RETRYABLE_KEYWORDS: &[&str] = &[
    "timeout",
    "timed out",
    "connection",
    "network",
    "temporary",
    "rate limit",
    "429",
    "502",
    "503",
    "504",
    "service unavailable",
    "too many requests",
];

const MAX_RESPONSE_BODY: usize = 500;
const MAX_RAW_MESSAGE: usize = 200;

/// Decide whether a failure is worth another attempt
///
/// An explicit tag wins; then keywords in the message; then the status table.
/// Untagged failures with no recognisable signal are not retried.
pub fn is_retryable(failure: &TaskFailure) -> bool {
    if let Some(hint) = failure.retry_hint {
        return hint;
    }

    let lower = failure.message.to_lowercase();
    if RETRYABLE_KEYWORDS.iter().any(|k| lower.contains(k)) {
        return true;
    }

    match failure.status_code {
        Some(429 | 502 | 503 | 504) => true,
        Some(status) => status >= 500,
        None => false,
    }
}

/// Fixed, non-leaking sentence describing a failure
pub fn user_message(failure: &TaskFailure) -> String {
    let msg = failure.message.as_str();
    let lower = msg.to_lowercase();
    let has = |needle: &str| lower.contains(needle);

    if has("api key")
        || has("api_key")
        || has("authentication")
        || has("unauthorized")
        || failure.kind == FailureKind::Authentication
    {
        return "API authentication failed. Please check your API key configuration.".to_string();
    }

    if has("timeout") || has("timed out") || failure.kind == FailureKind::Timeout {
        return "Request timed out. The service may be slow or unavailable. Please try again."
            .to_string();
    }

    if has("rate limit") || msg.contains("429") || failure.kind == FailureKind::RateLimit {
        return "Rate limit exceeded. Please wait a moment and try again.".to_string();
    }

    if has("connection") || has("network") || failure.kind == FailureKind::Network {
        return "Network error. Please check your internet connection and try again.".to_string();
    }

    if has("service unavailable")
        || msg.contains("503")
        || failure.kind == FailureKind::ServiceUnavailable
    {
        return "Service temporarily unavailable. Please try again in a few moments.".to_string();
    }

    if has("insufficient_quota") && has("openai") {
        return "OpenAI quota exceeded. Please check your billing and credits.".to_string();
    }

    if has("quota") || has("limit") || failure.kind == FailureKind::QuotaExceeded {
        return "Usage limit reached. Please check your account limits or upgrade your plan."
            .to_string();
    }

    if has("openai") {
        return "OpenAI service error. Please try again or contact support.".to_string();
    }

    if has("anthropic") || has("claude") {
        return "Claude service error. Please try again or contact support.".to_string();
    }

    if has("ollama") {
        if has("connection refused") {
            return "Ollama service not running. Please start Ollama locally or use a cloud provider."
                .to_string();
        }
        return "Local LLM service error. Please check Ollama installation.".to_string();
    }

    if msg.trim().is_empty() {
        return "An unexpected error occurred. Please try again.".to_string();
    }

    if msg.chars().count() > MAX_RAW_MESSAGE {
        let first = msg.split(". ").next().unwrap_or(msg);
        let first = crate::utils::truncate_chars(first, MAX_RAW_MESSAGE);
        return format!("{}. Please try again.", first.trim_end_matches('.'));
    }

    msg.to_string()
}

/// Structured record of a failure for logs, telemetry and the retry decision
pub fn extract_details(failure: &TaskFailure) -> ErrorDetail {
    ErrorDetail {
        kind: failure.kind,
        message: failure.message.clone(),
        retryable: is_retryable(failure),
        status_code: failure.status_code,
        response_body: failure
            .response_body
            .as_deref()
            .map(|body| crate::utils::truncate_chars(body, MAX_RESPONSE_BODY).to_string()),
    }
}
