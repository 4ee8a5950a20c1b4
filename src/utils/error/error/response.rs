//! HTTP response handling for errors

use super::types::GatewayError;
use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};

impl GatewayError {
    /// Status code and stable error code for this error
    pub fn status_and_code(&self) -> (StatusCode, &'static str) {
        match self {
            GatewayError::Config(_) => (StatusCode::INTERNAL_SERVER_ERROR, "CONFIG_ERROR"),
            GatewayError::HttpClient(_) => (StatusCode::BAD_GATEWAY, "HTTP_CLIENT_ERROR"),
            GatewayError::Serialization(_) | GatewayError::Yaml(_) => {
                (StatusCode::BAD_REQUEST, "PARSING_ERROR")
            }
            GatewayError::Io(_) => (StatusCode::INTERNAL_SERVER_ERROR, "IO_ERROR"),
            GatewayError::Provider(_) => (StatusCode::BAD_GATEWAY, "PROVIDER_ERROR"),
            GatewayError::RateLimit(_) => (StatusCode::TOO_MANY_REQUESTS, "RATE_LIMIT_EXCEEDED"),
            GatewayError::Validation(_) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR"),
            GatewayError::NotFound(_) => (StatusCode::NOT_FOUND, "NOT_FOUND"),
            GatewayError::ProviderUnavailable(_) => {
                (StatusCode::SERVICE_UNAVAILABLE, "SERVICE_UNAVAILABLE")
            }
            GatewayError::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR"),
        }
    }

    /// Message safe to show to API callers
    pub(crate) fn public_message(&self) -> String {
        match self {
            // Upstream details stay in the logs
            GatewayError::HttpClient(_) | GatewayError::Provider(_) => {
                "Upstream provider request failed".to_string()
            }
            GatewayError::Io(_) => "Internal I/O failure".to_string(),
            GatewayError::RateLimit(msg)
            | GatewayError::Validation(msg)
            | GatewayError::NotFound(msg)
            | GatewayError::ProviderUnavailable(msg) => msg.clone(),
            _ => self.to_string(),
        }
    }
}

impl ResponseError for GatewayError {
    fn status_code(&self) -> StatusCode {
        self.status_and_code().0
    }

    fn error_response(&self) -> HttpResponse {
        let (status_code, error_code) = self.status_and_code();

        let error_response = ErrorResponse {
            error: ErrorInfo {
                code: error_code.to_string(),
                message: self.public_message(),
                timestamp: chrono::Utc::now().timestamp(),
                request_id: None,
            },
        };

        HttpResponse::build(status_code).json(error_response)
    }
}

/// Error response structure
#[derive(Debug, serde::Serialize, serde::Deserialize)]
pub struct ErrorResponse {
    pub error: ErrorInfo,
}

/// Error detail structure
#[derive(Debug, serde::Serialize, serde::Deserialize)]
pub struct ErrorInfo {
    pub code: String,
    pub message: String,
    pub timestamp: i64,
    pub request_id: Option<String>,
}
