//! Provider configuration

use super::*;
use crate::core::types::ProviderKind;
use serde::{Deserialize, Serialize};

/// Configuration for one backend family
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderConfig {
    /// Backend family
    pub kind: ProviderKind,
    /// API key (not needed for Ollama)
    #[serde(default)]
    pub api_key: Option<String>,
    /// Base URL override
    #[serde(default)]
    pub api_base: Option<String>,
    /// Transport timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
    /// Whether the provider is registered at startup
    #[serde(default = "default_true")]
    pub enabled: bool,
}

impl ProviderConfig {
    pub fn new(kind: ProviderKind) -> Self {
        Self {
            kind,
            api_key: None,
            api_base: None,
            timeout_secs: match kind {
                // Local models are slower
                ProviderKind::Ollama => 120,
                _ => default_timeout(),
            },
            enabled: true,
        }
    }

    /// Effective base URL
    pub fn base_url(&self) -> &str {
        match self.api_base.as_deref().filter(|b| !b.trim().is_empty()) {
            Some(base) => base,
            None => default_base_url(self.kind),
        }
    }
}

/// Public endpoint for a provider family
pub fn default_base_url(kind: ProviderKind) -> &'static str {
    match kind {
        ProviderKind::OpenAI => "https://api.openai.com/v1",
        ProviderKind::Anthropic => "https://api.anthropic.com/v1",
        ProviderKind::Ollama => "http://localhost:11434",
    }
}

/// One entry per provider family, all enabled
pub fn default_providers() -> Vec<ProviderConfig> {
    ProviderKind::all()
        .into_iter()
        .map(ProviderConfig::new)
        .collect()
}
