//! Validators for each configuration section

use super::trait_def::Validate;
use crate::config::models::*;
use std::collections::HashSet;
use tracing::warn;

impl Validate for ServerConfig {
    fn validate(&self) -> Result<(), String> {
        if self.host.trim().is_empty() {
            return Err("Server host cannot be empty".to_string());
        }
        if self.port == 0 {
            return Err("Server port must be greater than 0".to_string());
        }
        if let Some(0) = self.workers {
            return Err("Worker count must be greater than 0".to_string());
        }
        if self.timeout == 0 {
            return Err("Server timeout must be greater than 0".to_string());
        }
        if self.max_body_size == 0 {
            return Err("Max body size must be greater than 0".to_string());
        }
        self.cors.validate()
    }
}

impl Validate for CorsConfig {
    fn validate(&self) -> Result<(), String> {
        for origin in &self.allowed_origins {
            if origin != "*" && url::Url::parse(origin).is_err() {
                return Err(format!("Invalid CORS origin: {}", origin));
            }
        }
        self.warn_if_permissive();
        Ok(())
    }
}

impl Validate for ProviderConfig {
    fn validate(&self) -> Result<(), String> {
        if self.timeout_secs == 0 {
            return Err(format!("{} timeout must be greater than 0", self.kind));
        }
        if let Some(base) = &self.api_base {
            if !base.trim().is_empty() && url::Url::parse(base).is_err() {
                return Err(format!("Invalid {} base URL: {}", self.kind, base));
            }
        }
        if self.enabled && self.kind.requires_api_key() && self.api_key.is_none() {
            warn!(
                "{} is enabled without an API key and will report itself unavailable",
                self.kind.display_name()
            );
        }
        Ok(())
    }
}

impl Validate for Vec<ProviderConfig> {
    fn validate(&self) -> Result<(), String> {
        let mut seen = HashSet::new();
        for provider in self {
            if !seen.insert(provider.kind) {
                return Err(format!("Provider {} is configured more than once", provider.kind));
            }
            provider.validate()?;
        }
        Ok(())
    }
}

impl Validate for OrchestratorConfig {
    fn validate(&self) -> Result<(), String> {
        if self.max_attempts == 0 {
            return Err("max_attempts must be at least 1".to_string());
        }
        if self.backoff_multiplier < 1.0 {
            return Err("backoff_multiplier must be at least 1.0".to_string());
        }
        if self.max_delay_ms < self.base_delay_ms {
            return Err("max_delay_ms must not be smaller than base_delay_ms".to_string());
        }
        if self.attempt_timeout_secs == 0 {
            return Err("attempt_timeout_secs must be greater than 0".to_string());
        }
        if self.replay_chunk_size == 0 {
            return Err("replay_chunk_size must be greater than 0".to_string());
        }
        Ok(())
    }
}

impl Validate for CacheConfig {
    fn validate(&self) -> Result<(), String> {
        if self.max_entries == 0 {
            return Err("Cache max_entries must be greater than 0".to_string());
        }
        if self.ttl_search_secs == 0 || self.ttl_chat_secs == 0 || self.ttl_default_secs == 0 {
            return Err("Cache TTLs must be greater than 0".to_string());
        }
        let stateful: HashSet<String> = self.stateful_kinds.iter().map(|k| k.to_lowercase()).collect();
        if let Some(kind) = self
            .informational_kinds
            .iter()
            .find(|k| stateful.contains(&k.to_lowercase()))
        {
            return Err(format!("Task kind '{}' cannot be both stateful and informational", kind));
        }
        Ok(())
    }
}

impl Validate for RateLimitConfig {
    fn validate(&self) -> Result<(), String> {
        if self.enabled && self.requests_per_minute == 0 {
            return Err("requests_per_minute must be greater than 0".to_string());
        }
        if let Some(budget) = self.hourly_cost_budget_usd {
            if !budget.is_finite() || budget <= 0.0 {
                return Err("hourly_cost_budget_usd must be a positive number".to_string());
            }
        }
        Ok(())
    }
}

impl Validate for PolicyConfig {
    fn validate(&self) -> Result<(), String> {
        if self.context_inflation < 1.0 {
            return Err("context_inflation must be at least 1.0".to_string());
        }
        if self.max_tokens_without_context == 0 || self.max_tokens_with_context == 0 {
            return Err("Token budgets must be greater than 0".to_string());
        }
        if self.fallback_chain.is_empty() {
            return Err("fallback_chain cannot be empty".to_string());
        }
        for entry in &self.models {
            if entry.model.trim().is_empty() {
                return Err(format!("Model name for {} cannot be empty", entry.provider));
            }
            if entry.cost_per_1k_tokens < 0.0 {
                return Err(format!("Negative cost for model {}", entry.model));
            }
        }
        Ok(())
    }
}

impl Validate for TelemetryConfig {
    fn validate(&self) -> Result<(), String> {
        if self.enabled && self.metrics_path.trim().is_empty() {
            return Err("metrics_path cannot be empty when telemetry is enabled".to_string());
        }
        if self.metrics_capacity == 0 {
            return Err("metrics_capacity must be greater than 0".to_string());
        }
        Ok(())
    }
}

impl Validate for LoggingConfig {
    fn validate(&self) -> Result<(), String> {
        tracing_subscriber::EnvFilter::try_new(&self.level)
            .map(|_| ())
            .map_err(|e| format!("Invalid log level '{}': {}", self.level, e))
    }
}
