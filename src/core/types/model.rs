//! Model specification types

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Backend family a model is served by
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    #[serde(rename = "openai")]
    OpenAI,
    Anthropic,
    Ollama,
}

impl ProviderKind {
    /// Stable lowercase identifier
    pub fn as_str(&self) -> &'static str {
        match self {
            ProviderKind::OpenAI => "openai",
            ProviderKind::Anthropic => "anthropic",
            ProviderKind::Ollama => "ollama",
        }
    }

    /// Human readable name used in provider error messages
    pub fn display_name(&self) -> &'static str {
        match self {
            ProviderKind::OpenAI => "OpenAI",
            ProviderKind::Anthropic => "Anthropic",
            ProviderKind::Ollama => "Ollama",
        }
    }

    /// Hosted APIs need a key; local Ollama does not
    pub fn requires_api_key(&self) -> bool {
        !matches!(self, ProviderKind::Ollama)
    }

    pub fn all() -> [ProviderKind; 3] {
        [
            ProviderKind::OpenAI,
            ProviderKind::Anthropic,
            ProviderKind::Ollama,
        ]
    }
}

impl fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProviderKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "openai" => Ok(ProviderKind::OpenAI),
            "anthropic" | "claude" => Ok(ProviderKind::Anthropic),
            "ollama" => Ok(ProviderKind::Ollama),
            other => Err(format!("Unknown provider: {}", other)),
        }
    }
}

/// Model choice for one attempt, supplied by the policy engine
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelSpec {
    /// Provider family
    pub provider: ProviderKind,
    /// Model identifier as the provider knows it
    pub model: String,
    /// Default completion budget
    pub max_tokens: u32,
    /// Default sampling temperature
    pub temperature: f32,
    /// Price per 1000 tokens in USD; zero means unknown
    #[serde(default)]
    pub cost_per_1k_tokens: f64,
}

impl ModelSpec {
    pub fn new(provider: ProviderKind, model: impl Into<String>) -> Self {
        Self {
            provider,
            model: model.into(),
            max_tokens: 1000,
            temperature: 0.7,
            cost_per_1k_tokens: 0.0,
        }
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    pub fn with_cost(mut self, cost_per_1k_tokens: f64) -> Self {
        self.cost_per_1k_tokens = cost_per_1k_tokens;
        self
    }

    /// True when both specs point to the same provider and model
    pub fn same_target(&self, other: &ModelSpec) -> bool {
        self.provider == other.provider && self.model == other.model
    }
}
