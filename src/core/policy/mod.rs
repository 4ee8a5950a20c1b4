//! Model selection policy
//!
//! Chooses the model for a task, the fallback after a fatal failure, and the
//! system prompt the task runs under.

mod prompts;
mod static_policy;
mod types;


pub use static_policy::StaticPolicy;
pub use types::{CostTier, KindDefaults};

use crate::core::types::{ModelSpec, ProviderKind};
use serde_json::Value;
use std::collections::{BTreeSet, HashMap};

/// Model selection and prompt policy consulted by the orchestrator
pub trait PolicyEngine: Send + Sync {
    /// Primary model for a task
    fn select_model(
        &self,
        kind: &str,
        tier: CostTier,
        available: &BTreeSet<ProviderKind>,
    ) -> ModelSpec;

    /// Alternate model after `failed` failed fatally, never the same target
    fn fallback_for(&self, failed: &ModelSpec, available: &BTreeSet<ProviderKind>)
    -> Option<ModelSpec>;

    /// System prompt for a task kind
    fn system_prompt(&self, kind: &str) -> String;

    /// Prompt replacing the kind prompt for a UI mode, if the mode is known
    fn mode_prompt(&self, mode: &str) -> Option<String>;

    /// Cost tier requested by the caller's metadata
    fn resolve_cost_tier(&self, metadata: &HashMap<String, Value>) -> CostTier;

    /// Provider assumed when no provider reports itself available
    fn default_provider(&self) -> ProviderKind;
}
