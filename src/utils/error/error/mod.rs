//! Error handling for the Gateway
//!
//! This module defines the error type returned before a task starts streaming.
//! Once streaming has begun, provider failures are reported through the
//! terminal `error` event instead.

#![allow(missing_docs)]

mod response;
mod types;

pub use response::{ErrorInfo, ErrorResponse};
pub use types::{GatewayError, Result};
