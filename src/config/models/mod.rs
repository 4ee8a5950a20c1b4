//! Configuration data models
//!
//! This module defines all configuration structures used throughout the gateway.

#![allow(missing_docs)]

pub mod cache;
pub mod gateway;
pub mod logging;
pub mod orchestrator;
pub mod policy;
pub mod provider;
pub mod rate_limit;
pub mod server;
pub mod telemetry;

// Re-export all configuration types
pub use cache::*;
pub use gateway::*;
pub use logging::*;
pub use orchestrator::*;
pub use policy::*;
pub use provider::*;
pub use rate_limit::*;
pub use server::*;
pub use telemetry::*;

/// Default values for configuration
pub fn default_host() -> String {
    "0.0.0.0".to_string()
}

/// Default server port
pub fn default_port() -> u16 {
    8000
}

/// Default timeout in seconds
pub fn default_timeout() -> u64 {
    60
}

/// Default maximum body size in bytes
pub fn default_max_body_size() -> usize {
    1024 * 1024 // 1MB
}

pub fn default_true() -> bool {
    true
}

/// Default maximum attempts per task (primary plus retries/fallbacks)
pub fn default_max_attempts() -> u32 {
    3
}

pub fn default_base_delay_ms() -> u64 {
    500
}

pub fn default_max_delay_ms() -> u64 {
    5000
}

pub fn default_backoff_multiplier() -> f64 {
    2.0
}

pub fn default_replay_chunk_size() -> usize {
    10
}

pub fn default_cache_max_entries() -> usize {
    1000
}

pub fn default_min_prompt_length() -> usize {
    10
}

pub fn default_ttl_search() -> u64 {
    1800 // 30 minutes
}

pub fn default_ttl_chat() -> u64 {
    7200 // 2 hours
}

pub fn default_ttl_default() -> u64 {
    3600 // 1 hour
}

pub fn default_rpm() -> u32 {
    60
}

pub fn default_context_inflation() -> f64 {
    1.3
}

pub fn default_max_tokens_without_context() -> u32 {
    2000
}

pub fn default_max_tokens_with_context() -> u32 {
    2500
}

pub fn default_metrics_path() -> String {
    "logs/ai_tasks.jsonl".to_string()
}

pub fn default_metrics_capacity() -> usize {
    10_000
}

pub fn default_log_level() -> String {
    "info".to_string()
}
