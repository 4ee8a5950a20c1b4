//! Configuration-driven policy engine

use super::PolicyEngine;
use super::prompts::{DEFAULT_PROMPT, KIND_PROMPTS, MODE_PROMPTS};
use super::types::{CostTier, KindDefaults};
use crate::config::models::policy::PolicyConfig;
use crate::core::types::{ModelSpec, ProviderKind};
use serde_json::Value;
use std::collections::{BTreeMap, BTreeSet, HashMap};
use tracing::debug;

const DEFAULT_KIND: KindDefaults = KindDefaults::new(0.7, 1000);

#[derive(Debug, Clone, PartialEq)]
struct CatalogEntry {
    model: String,
    cost_per_1k_tokens: f64,
}

/// Policy backed by a static model catalog
#[derive(Debug, Clone)]
pub struct StaticPolicy {
    default_tier: CostTier,
    fallback_chain: Vec<ProviderKind>,
    catalog: BTreeMap<(ProviderKind, CostTier), CatalogEntry>,
    kind_defaults: HashMap<String, KindDefaults>,
    prompts: HashMap<String, String>,
    mode_prompts: HashMap<String, String>,
}

impl Default for StaticPolicy {
    fn default() -> Self {
        Self::new(&PolicyConfig::default())
    }
}

impl StaticPolicy {
    pub fn new(config: &PolicyConfig) -> Self {
        let mut catalog = builtin_catalog();
        for entry in &config.models {
            catalog.insert(
                (entry.provider, entry.tier),
                CatalogEntry {
                    model: entry.model.clone(),
                    cost_per_1k_tokens: entry.cost_per_1k_tokens,
                },
            );
        }

        let kind_defaults = [
            ("search", KindDefaults::new(0.3, 1500)),
            ("chat", KindDefaults::new(0.7, 1000)),
            ("summary", KindDefaults::new(0.3, 800)),
            ("agent", KindDefaults::new(0.2, 2000)),
        ]
        .into_iter()
        .map(|(kind, defaults)| (kind.to_string(), defaults))
        .collect();

        Self {
            default_tier: config.default_cost_tier,
            fallback_chain: config.fallback_chain.clone(),
            catalog,
            kind_defaults,
            prompts: to_map(KIND_PROMPTS),
            mode_prompts: to_map(MODE_PROMPTS),
        }
    }

    /// Override the system prompt of a task kind
    pub fn with_system_prompt(mut self, kind: &str, prompt: impl Into<String>) -> Self {
        self.prompts.insert(kind.to_lowercase(), prompt.into());
        self
    }

    /// Register a UI mode prompt
    pub fn with_mode_prompt(mut self, mode: &str, prompt: impl Into<String>) -> Self {
        self.mode_prompts.insert(mode.to_lowercase(), prompt.into());
        self
    }

    /// Override sampling defaults of a task kind
    pub fn with_kind_defaults(mut self, kind: &str, defaults: KindDefaults) -> Self {
        self.kind_defaults.insert(kind.to_lowercase(), defaults);
        self
    }

    fn defaults_for(&self, kind: &str) -> KindDefaults {
        self.kind_defaults
            .get(&kind.to_lowercase())
            .copied()
            .unwrap_or(DEFAULT_KIND)
    }

    /// Catalog entry for a provider, preferring the closest tier
    fn entry_for(&self, provider: ProviderKind, tier: CostTier) -> Option<&CatalogEntry> {
        tier.nearest()
            .into_iter()
            .find_map(|t| self.catalog.get(&(provider, t)))
    }

    /// Tier of a catalog model, if the spec came from the catalog
    fn tier_of(&self, spec: &ModelSpec) -> Option<CostTier> {
        self.catalog
            .iter()
            .filter(|((provider, _), entry)| *provider == spec.provider && entry.model == spec.model)
            .map(|((_, tier), _)| *tier)
            .next()
    }

    /// Providers in preference order; chain members first, then the rest
    fn ordered_providers(&self) -> Vec<ProviderKind> {
        let mut ordered = self.fallback_chain.clone();
        for provider in ProviderKind::all() {
            if !ordered.contains(&provider) {
                ordered.push(provider);
            }
        }
        ordered
    }

    fn build_spec(&self, provider: ProviderKind, entry: &CatalogEntry, defaults: KindDefaults) -> ModelSpec {
        ModelSpec::new(provider, entry.model.clone())
            .with_max_tokens(defaults.max_tokens)
            .with_temperature(defaults.temperature)
            .with_cost(entry.cost_per_1k_tokens)
    }
}

impl PolicyEngine for StaticPolicy {
    fn select_model(
        &self,
        kind: &str,
        tier: CostTier,
        available: &BTreeSet<ProviderKind>,
    ) -> ModelSpec {
        let defaults = self.defaults_for(kind);
        let ordered = self.ordered_providers();

        let candidates = ordered
            .iter()
            .filter(|p| available.is_empty() || available.contains(*p))
            .chain(ordered.iter());

        for &provider in candidates {
            if let Some(entry) = self.entry_for(provider, tier) {
                debug!(kind, tier = %tier, provider = %provider, model = %entry.model, "Selected model");
                return self.build_spec(provider, entry, defaults);
            }
        }

        // Empty catalog; fall back to the first chain provider with a placeholder model
        let provider = self.default_provider();
        ModelSpec::new(provider, default_model(provider))
            .with_max_tokens(defaults.max_tokens)
            .with_temperature(defaults.temperature)
    }

    fn fallback_for(
        &self,
        failed: &ModelSpec,
        available: &BTreeSet<ProviderKind>,
    ) -> Option<ModelSpec> {
        let tier = self.tier_of(failed).unwrap_or(self.default_tier);
        let defaults = KindDefaults::new(failed.temperature, failed.max_tokens);

        let ordered = self.ordered_providers();
        let start = ordered
            .iter()
            .position(|p| *p == failed.provider)
            .map(|i| i + 1)
            .unwrap_or(0);

        // Providers after the failed one, wrapping around
        let rotation = ordered[start..].iter().chain(ordered[..start].iter());

        for &provider in rotation {
            if provider == failed.provider {
                continue;
            }
            if !available.is_empty() && !available.contains(&provider) {
                continue;
            }
            if let Some(entry) = self.entry_for(provider, tier) {
                let spec = self.build_spec(provider, entry, defaults);
                if !spec.same_target(failed) {
                    return Some(spec);
                }
            }
        }
        None
    }

    fn system_prompt(&self, kind: &str) -> String {
        self.prompts
            .get(&kind.to_lowercase())
            .cloned()
            .unwrap_or_else(|| DEFAULT_PROMPT.to_string())
    }

    fn mode_prompt(&self, mode: &str) -> Option<String> {
        self.mode_prompts.get(&mode.trim().to_lowercase()).cloned()
    }

    fn resolve_cost_tier(&self, metadata: &HashMap<String, Value>) -> CostTier {
        metadata
            .get("cost_tier")
            .and_then(Value::as_str)
            .and_then(|t| t.parse().ok())
            .unwrap_or(self.default_tier)
    }

    fn default_provider(&self) -> ProviderKind {
        self.fallback_chain
            .first()
            .copied()
            .unwrap_or(ProviderKind::OpenAI)
    }
}

fn to_map(pairs: &[(&str, &str)]) -> HashMap<String, String> {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

fn default_model(provider: ProviderKind) -> &'static str {
    match provider {
        ProviderKind::OpenAI => "gpt-4o-mini",
        ProviderKind::Anthropic => "claude-3-haiku-20240307",
        ProviderKind::Ollama => "llama3",
    }
}

fn builtin_catalog() -> BTreeMap<(ProviderKind, CostTier), CatalogEntry> {
    let entries = [
        (ProviderKind::OpenAI, CostTier::Economy, "gpt-4o-mini", 0.0006),
        (ProviderKind::OpenAI, CostTier::Standard, "gpt-4o-mini", 0.0006),
        (ProviderKind::OpenAI, CostTier::Premium, "gpt-4o", 0.01),
        (ProviderKind::Anthropic, CostTier::Economy, "claude-3-haiku-20240307", 0.00125),
        (ProviderKind::Anthropic, CostTier::Standard, "claude-3-haiku-20240307", 0.00125),
        (ProviderKind::Anthropic, CostTier::Premium, "claude-3-5-sonnet-20241022", 0.015),
        // Local models have no per-token price
        (ProviderKind::Ollama, CostTier::Economy, "llama3", 0.0),
        (ProviderKind::Ollama, CostTier::Standard, "llama3", 0.0),
        (ProviderKind::Ollama, CostTier::Premium, "llama3", 0.0),
    ];

    entries
        .into_iter()
        .map(|(provider, tier, model, cost)| {
            (
                (provider, tier),
                CatalogEntry {
                    model: model.to_string(),
                    cost_per_1k_tokens: cost,
                },
            )
        })
        .collect()
}
