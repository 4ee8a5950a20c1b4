//! Core functionality for the gateway

pub mod cache_manager;
pub mod classifier;
pub mod context;
pub mod orchestrator;
pub mod policy;
pub mod providers;
pub mod rate_limiter;
pub mod telemetry;
pub mod types;
