//! Configuration loading utilities
//!
//! Environment overrides applied on top of a file or default configuration.

use super::models::*;
use crate::core::types::ProviderKind;
use crate::utils::error::{GatewayError, Result};
use std::env;
use std::str::FromStr;
use tracing::debug;

impl GatewayConfig {
    /// Load configuration from environment variables on top of defaults
    pub fn from_env() -> Result<Self> {
        debug!("Loading configuration from environment variables");
        let mut config = Self::default();
        config.apply_env_overrides()?;
        Ok(config)
    }

    /// Apply overrides from the process environment
    pub fn apply_env_overrides(&mut self) -> Result<()> {
        self.apply_overrides_from(|key| env::var(key).ok())
    }

    /// Apply overrides using an arbitrary variable lookup
    pub fn apply_overrides_from<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        // Server configuration
        if let Some(host) = var("GATEWAY_HOST") {
            self.server.host = host;
        }
        if let Some(port) = var("GATEWAY_PORT") {
            self.server.port = parse_var("GATEWAY_PORT", &port)?;
        }
        if let Some(workers) = var("GATEWAY_WORKERS") {
            self.server.workers = Some(parse_var("GATEWAY_WORKERS", &workers)?);
        }

        // Cache configuration
        if let Some(enabled) = var("AI_CACHE_ENABLED") {
            self.cache.cache_other_kinds = parse_flag("AI_CACHE_ENABLED", &enabled)?;
        }
        if let Some(max) = var("AI_CACHE_MAX_ENTRIES") {
            self.cache.max_entries = parse_var("AI_CACHE_MAX_ENTRIES", &max)?;
        }
        if let Some(ttl) = var("AI_CACHE_TTL_SEARCH") {
            self.cache.ttl_search_secs = parse_var("AI_CACHE_TTL_SEARCH", &ttl)?;
        }
        if let Some(ttl) = var("AI_CACHE_TTL_CHAT") {
            self.cache.ttl_chat_secs = parse_var("AI_CACHE_TTL_CHAT", &ttl)?;
        }
        if let Some(ttl) = var("AI_CACHE_TTL_DEFAULT") {
            self.cache.ttl_default_secs = parse_var("AI_CACHE_TTL_DEFAULT", &ttl)?;
        }

        // Telemetry configuration
        if let Some(path) = var("AI_TASK_METRICS_PATH") {
            self.telemetry.metrics_path = path;
        }

        // Providers
        if let Some(key) = var("OPENAI_API_KEY") {
            self.provider_mut(ProviderKind::OpenAI).api_key = Some(key);
        }
        if let Some(key) = var("ANTHROPIC_API_KEY") {
            self.provider_mut(ProviderKind::Anthropic).api_key = Some(key);
        }
        if let Some(base) = var("OPENAI_BASE_URL") {
            self.provider_mut(ProviderKind::OpenAI).api_base = Some(base);
        }
        if let Some(base) = var("ANTHROPIC_BASE_URL") {
            self.provider_mut(ProviderKind::Anthropic).api_base = Some(base);
        }
        if let Some(base) = var("OLLAMA_BASE_URL") {
            self.provider_mut(ProviderKind::Ollama).api_base = Some(base);
        }

        debug!("Environment overrides applied");
        Ok(())
    }
}

fn parse_var<T>(key: &str, value: &str) -> Result<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    value
        .trim()
        .parse()
        .map_err(|e| GatewayError::Config(format!("Invalid {}: {}", key, e)))
}

fn parse_flag(key: &str, value: &str) -> Result<bool> {
    match value.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        other => Err(GatewayError::Config(format!(
            "Invalid {}: expected a boolean, got '{}'",
            key, other
        ))),
    }
}

/// Expand `${VAR}` references in configuration text
pub fn expand_env_vars(input: &str) -> String {
    expand_vars_with(input, |key| env::var(key).ok())
}

pub(crate) fn expand_vars_with<F>(input: &str, lookup: F) -> String
where
    F: Fn(&str) -> Option<String>,
{
    let mut result = String::with_capacity(input.len());
    let mut rest = input;

    while let Some(start) = rest.find("${") {
        result.push_str(&rest[..start]);
        let after = &rest[start + 2..];
        match after.find('}') {
            Some(end) => {
                let name = &after[..end];
                // Unknown variables expand to nothing
                result.push_str(&lookup(name).unwrap_or_default());
                rest = &after[end + 1..];
            }
            None => {
                result.push_str(&rest[start..]);
                rest = "";
            }
        }
    }
    result.push_str(rest);
    result
}
