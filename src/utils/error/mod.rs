//! Error Handling utilities
//!
//! This module provides the crate-wide error type and its HTTP mapping.

#[allow(clippy::module_inception)]
pub mod error;

// Re-export commonly used types and functions
pub use error::*;
