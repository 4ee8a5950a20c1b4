//! Cache configuration

use super::*;
use serde::{Deserialize, Serialize};

/// Response cache configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CacheConfig {
    /// Master switch
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Maximum number of cached responses
    #[serde(default = "default_cache_max_entries")]
    pub max_entries: usize,
    /// Prompts shorter than this are never cached
    #[serde(default = "default_min_prompt_length")]
    pub min_prompt_length: usize,
    #[serde(default = "default_ttl_search")]
    pub ttl_search_secs: u64,
    /// TTL for chat and summary tasks
    #[serde(default = "default_ttl_chat")]
    pub ttl_chat_secs: u64,
    #[serde(default = "default_ttl_default")]
    pub ttl_default_secs: u64,
    /// Kinds that are never cached
    #[serde(default = "default_stateful_kinds")]
    pub stateful_kinds: Vec<String>,
    /// Kinds that are always cached
    #[serde(default = "default_informational_kinds")]
    pub informational_kinds: Vec<String>,
    /// Whether kinds in neither list are cached
    #[serde(default = "default_true")]
    pub cache_other_kinds: bool,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            max_entries: default_cache_max_entries(),
            min_prompt_length: default_min_prompt_length(),
            ttl_search_secs: default_ttl_search(),
            ttl_chat_secs: default_ttl_chat(),
            ttl_default_secs: default_ttl_default(),
            stateful_kinds: default_stateful_kinds(),
            informational_kinds: default_informational_kinds(),
            cache_other_kinds: true,
        }
    }
}

fn default_stateful_kinds() -> Vec<String> {
    vec!["agent".to_string(), "execute".to_string()]
}

fn default_informational_kinds() -> Vec<String> {
    vec![
        "search".to_string(),
        "chat".to_string(),
        "summary".to_string(),
    ]
}
