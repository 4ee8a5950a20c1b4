//! Main gateway configuration

#![allow(missing_docs)]

use super::*;
use serde::{Deserialize, Serialize};

/// Main gateway configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewayConfig {
    /// Server configuration
    #[serde(default)]
    pub server: ServerConfig,
    /// Provider configurations
    #[serde(default = "default_providers")]
    pub providers: Vec<ProviderConfig>,
    /// Retry and fallback configuration
    #[serde(default)]
    pub orchestrator: OrchestratorConfig,
    /// Response cache configuration
    #[serde(default)]
    pub cache: CacheConfig,
    /// Rate limiting configuration
    #[serde(default)]
    pub rate_limit: RateLimitConfig,
    /// Model selection policy
    #[serde(default)]
    pub policy: PolicyConfig,
    /// Outcome telemetry
    #[serde(default)]
    pub telemetry: TelemetryConfig,
    /// Log output
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            providers: default_providers(),
            orchestrator: OrchestratorConfig::default(),
            cache: CacheConfig::default(),
            rate_limit: RateLimitConfig::default(),
            policy: PolicyConfig::default(),
            telemetry: TelemetryConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl GatewayConfig {
    /// Provider entry for a family, if configured
    pub fn provider(&self, kind: crate::core::types::ProviderKind) -> Option<&ProviderConfig> {
        self.providers.iter().find(|p| p.kind == kind)
    }

    /// Provider entry for a family, created with defaults when missing
    pub fn provider_mut(&mut self, kind: crate::core::types::ProviderKind) -> &mut ProviderConfig {
        let index = match self.providers.iter().position(|p| p.kind == kind) {
            Some(index) => index,
            None => {
                self.providers.push(ProviderConfig::new(kind));
                self.providers.len() - 1
            }
        };
        &mut self.providers[index]
    }
}
