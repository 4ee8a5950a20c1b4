//! Model selection policy configuration

use super::*;
use crate::core::policy::CostTier;
use crate::core::types::ProviderKind;
use serde::{Deserialize, Serialize};

/// Policy engine configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PolicyConfig {
    /// Tier used when the request does not name one
    #[serde(default)]
    pub default_cost_tier: CostTier,
    /// Budget multiplier applied when enhanced context is present
    #[serde(default = "default_context_inflation")]
    pub context_inflation: f64,
    #[serde(default = "default_max_tokens_without_context")]
    pub max_tokens_without_context: u32,
    #[serde(default = "default_max_tokens_with_context")]
    pub max_tokens_with_context: u32,
    /// Provider order tried on fallback
    #[serde(default = "default_fallback_chain")]
    pub fallback_chain: Vec<ProviderKind>,
    /// Catalog overrides, replacing built-in entries with the same provider and tier
    #[serde(default)]
    pub models: Vec<ModelEntryConfig>,
}

impl Default for PolicyConfig {
    fn default() -> Self {
        Self {
            default_cost_tier: CostTier::default(),
            context_inflation: default_context_inflation(),
            max_tokens_without_context: default_max_tokens_without_context(),
            max_tokens_with_context: default_max_tokens_with_context(),
            fallback_chain: default_fallback_chain(),
            models: vec![],
        }
    }
}

/// One catalog entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelEntryConfig {
    pub provider: ProviderKind,
    pub tier: CostTier,
    pub model: String,
    #[serde(default)]
    pub cost_per_1k_tokens: f64,
}

pub fn default_fallback_chain() -> Vec<ProviderKind> {
    vec![
        ProviderKind::OpenAI,
        ProviderKind::Anthropic,
        ProviderKind::Ollama,
    ]
}
