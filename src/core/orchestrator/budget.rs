//! Token budget and cost estimation

use crate::config::models::policy::PolicyConfig;
use crate::core::types::{ModelSpec, Usage};

/// Rough pre-flight price per thousand prompt characters, in USD
const PREFLIGHT_COST_PER_1K_CHARS: f64 = 0.001;

/// Caps applied to the completion budget
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TokenBudget {
    pub context_inflation: f64,
    pub max_without_context: u32,
    pub max_with_context: u32,
}

impl Default for TokenBudget {
    fn default() -> Self {
        Self::from(&PolicyConfig::default())
    }
}

impl From<&PolicyConfig> for TokenBudget {
    fn from(config: &PolicyConfig) -> Self {
        Self {
            context_inflation: config.context_inflation,
            max_without_context: config.max_tokens_without_context,
            max_with_context: config.max_tokens_with_context,
        }
    }
}

impl TokenBudget {
    /// Completion budget for a spec, given the caller's override
    pub fn max_tokens(&self, spec_max: u32, requested: Option<u32>, has_context: bool) -> u32 {
        if has_context {
            let inflated = (spec_max as f64 * self.context_inflation) as u32;
            enforce_token_budget(requested, inflated.max(spec_max), self.max_with_context)
        } else {
            enforce_token_budget(requested, spec_max, self.max_without_context)
        }
    }
}

/// Requested budget, or the default, never above `absolute_max` and never zero
pub fn enforce_token_budget(requested: Option<u32>, default: u32, absolute_max: u32) -> u32 {
    requested
        .filter(|r| *r > 0)
        .unwrap_or(default)
        .min(absolute_max)
        .max(1)
}

/// Linear cost in USD; `None` when the model has no configured price or no usage was reported
pub fn estimate_cost(spec: &ModelSpec, usage: Option<&Usage>) -> Option<f64> {
    if spec.cost_per_1k_tokens <= 0.0 {
        return None;
    }
    let usage = usage?;
    let tokens = u64::from(usage.prompt_tokens) + u64::from(usage.completion_tokens);
    Some(tokens as f64 / 1000.0 * spec.cost_per_1k_tokens)
}

/// Cost guess from prompt length, used only for admission control
pub fn preflight_cost(prompt: &str) -> f64 {
    prompt.chars().count() as f64 / 1000.0 * PREFLIGHT_COST_PER_1K_CHARS
}
