//! Cacheability and TTL policy

use crate::config::models::cache::CacheConfig;
use std::time::Duration;

/// Decides which tasks are cached and for how long
#[derive(Debug, Clone)]
pub struct CachePolicy {
    config: CacheConfig,
}

impl CachePolicy {
    pub fn new(config: CacheConfig) -> Self {
        Self { config }
    }

    /// Whether a (kind, prompt) pair may read or write the cache
    ///
    /// Short prompts are treated as commands and stateful kinds are never
    /// cached; informational kinds always are; other kinds follow
    /// `cache_other_kinds`.
    pub fn should_cache(&self, kind: &str, prompt: &str) -> bool {
        if !self.config.enabled {
            return false;
        }
        if prompt.trim().chars().count() < self.config.min_prompt_length {
            return false;
        }

        let kind = kind.to_lowercase();
        if contains_kind(&self.config.stateful_kinds, &kind) {
            return false;
        }
        if contains_kind(&self.config.informational_kinds, &kind) {
            return true;
        }
        self.config.cache_other_kinds
    }

    /// TTL for a task kind
    pub fn ttl_for(&self, kind: &str) -> Duration {
        let secs = match kind.to_lowercase().as_str() {
            "search" => self.config.ttl_search_secs,
            "summary" | "chat" => self.config.ttl_chat_secs,
            _ => self.config.ttl_default_secs,
        };
        Duration::from_secs(secs)
    }
}

fn contains_kind(kinds: &[String], kind: &str) -> bool {
    kinds.iter().any(|k| k.eq_ignore_ascii_case(kind))
}
