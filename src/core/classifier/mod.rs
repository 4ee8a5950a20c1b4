//! Error classification for provider failures
//!
//! Turns any attempt failure into an [`ErrorDetail`]: a retry decision, a
//! sanitized user-facing sentence and a structured record for logs and
//! telemetry. All functions here are pure.

pub mod rules;
pub mod types;


pub use rules::{extract_details, is_retryable, user_message};
pub use types::{ErrorDetail, FailureKind, TaskFailure};
