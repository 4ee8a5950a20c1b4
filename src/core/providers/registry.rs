//! Provider Registry
//!
//! Holds one [`Provider`] per backend family, constructed once at startup.

use super::{Provider, ProviderError};
use crate::config::models::provider::ProviderConfig;
use crate::core::types::ProviderKind;
use futures::future::join_all;
use std::collections::{BTreeSet, HashMap};
use tracing::{debug, info};

/// Provider Registry keyed by provider family
#[derive(Default)]
pub struct ProviderRegistry {
    providers: HashMap<ProviderKind, Provider>,
}

impl ProviderRegistry {
    /// Create new provider registry
    pub fn new() -> Self {
        Self {
            providers: HashMap::new(),
        }
    }

    /// Build clients for every enabled provider entry
    pub fn from_configs(configs: &[ProviderConfig]) -> Result<Self, ProviderError> {
        let mut registry = Self::new();
        for config in configs.iter().filter(|c| c.enabled) {
            registry.register(Provider::from_config(config)?);
            info!(provider = %config.kind, base_url = %config.base_url(), "Registered provider");
        }
        Ok(registry)
    }

    /// Register a provider, replacing any previous one of the same family
    pub fn register(&mut self, provider: Provider) {
        self.providers.insert(provider.kind(), provider);
    }

    /// Get provider by family
    pub fn get(&self, kind: ProviderKind) -> Option<&Provider> {
        self.providers.get(&kind)
    }

    /// Check if provider is registered
    pub fn contains(&self, kind: ProviderKind) -> bool {
        self.providers.contains_key(&kind)
    }

    /// List all registered provider families
    pub fn list(&self) -> Vec<ProviderKind> {
        let mut kinds: Vec<_> = self.providers.keys().copied().collect();
        kinds.sort();
        kinds
    }

    /// Get provider count
    pub fn len(&self) -> usize {
        self.providers.len()
    }

    /// Check if registry is empty
    pub fn is_empty(&self) -> bool {
        self.providers.is_empty()
    }

    /// Registered providers currently reporting available
    pub async fn available(&self) -> BTreeSet<ProviderKind> {
        let checks = self.providers.iter().map(|(kind, provider)| async move {
            (*kind, provider.is_available().await)
        });

        join_all(checks)
            .await
            .into_iter()
            .filter_map(|(kind, up)| {
                debug!(provider = %kind, available = up, "Provider availability");
                up.then_some(kind)
            })
            .collect()
    }
}

impl std::fmt::Debug for ProviderRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProviderRegistry")
            .field("provider_count", &self.providers.len())
            .field("providers", &self.list())
            .finish()
    }
}
