//! Policy types

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Quality/price bracket used for model selection
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum CostTier {
    Economy,
    #[default]
    Standard,
    Premium,
}

impl CostTier {
    pub fn as_str(&self) -> &'static str {
        match self {
            CostTier::Economy => "economy",
            CostTier::Standard => "standard",
            CostTier::Premium => "premium",
        }
    }

    /// Tiers ordered by closeness to `self`, starting with `self`
    pub fn nearest(&self) -> [CostTier; 3] {
        match self {
            CostTier::Economy => [CostTier::Economy, CostTier::Standard, CostTier::Premium],
            CostTier::Standard => [CostTier::Standard, CostTier::Economy, CostTier::Premium],
            CostTier::Premium => [CostTier::Premium, CostTier::Standard, CostTier::Economy],
        }
    }
}

impl fmt::Display for CostTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CostTier {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "economy" | "low" | "cheap" => Ok(CostTier::Economy),
            "standard" | "default" => Ok(CostTier::Standard),
            "premium" | "high" => Ok(CostTier::Premium),
            other => Err(format!("Unknown cost tier: {}", other)),
        }
    }
}

/// Sampling defaults for a task kind
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct KindDefaults {
    pub temperature: f32,
    pub max_tokens: u32,
}

impl KindDefaults {
    pub const fn new(temperature: f32, max_tokens: u32) -> Self {
        Self {
            temperature,
            max_tokens,
        }
    }
}
