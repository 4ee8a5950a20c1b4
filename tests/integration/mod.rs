//! Integration tests for ai-task-gateway
//!
//! These tests drive the orchestrator, the wire clients and the HTTP
//! surface through their public APIs.

pub mod cache_tests;
pub mod orchestrator_tests;
pub mod provider_client_tests;
pub mod server_tests;
