//! Cache key derivation

use serde_json::{Map, Value, json};
use sha2::{Digest, Sha256};
use std::collections::BTreeMap;
use std::fmt;

/// Characters of the first list item kept as a preview
const PREVIEW_CHARS: usize = 100;
/// Hex characters of the context digest kept in the key
const CONTEXT_HASH_LEN: usize = 16;

/// Deterministic fingerprint of (prompt, kind, model, context)
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey(String);

impl CacheKey {
    /// Build a key; prompt, kind and model are compared case-insensitively
    pub fn new(prompt: &str, kind: &str, model: &str, context_hash: &str) -> Self {
        let mut parts = vec![prompt.trim().to_lowercase(), kind.to_lowercase()];
        if !model.is_empty() {
            parts.push(model.to_lowercase());
        }
        if !context_hash.is_empty() {
            parts.push(context_hash.to_string());
        }

        let mut hasher = Sha256::new();
        hasher.update(parts.join("|").as_bytes());
        Self(hex::encode(hasher.finalize()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

fn preview(value: &Value) -> String {
    let text = match value {
        Value::Object(item) => ["value", "text", "content"]
            .iter()
            .find_map(|field| item.get(*field).and_then(|v| v.as_str()))
            .unwrap_or_default()
            .to_string(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    };
    text.chars().take(PREVIEW_CHARS).collect()
}

fn list_signal(value: &Value) -> Option<Value> {
    let items = value.as_array().filter(|items| !items.is_empty())?;
    Some(json!({
        "count": items.len(),
        "first_value": preview(&items[0]),
    }))
}

/// Hash the stable part of a context blob
///
/// Only whitelisted fields contribute: list fields (`memories`, `agent_runs`,
/// `documents`) as a count plus first-item preview, `active_tab` as its URL,
/// and the free-form `custom`/`additional` blocks verbatim. Everything else,
/// including timestamps and ephemeral ids, is ignored. Keys are serialized in
/// sorted order. Returns an empty string when nothing stable remains.
pub fn hash_context(context: Option<&Value>) -> String {
    let Some(Value::Object(context)) = context else {
        return String::new();
    };

    let mut normalized: BTreeMap<&str, Value> = BTreeMap::new();
    for (key, value) in context {
        let signal = match key.as_str() {
            "memories" | "agent_runs" | "documents" => list_signal(value),
            "active_tab" => value
                .get("url")
                .and_then(|u| u.as_str())
                .map(|u| Value::String(u.to_string())),
            "custom" | "additional" if !value.is_null() => Some(sorted(value)),
            _ => None,
        };
        if let Some(signal) = signal {
            normalized.insert(key.as_str(), signal);
        }
    }

    if normalized.is_empty() {
        return String::new();
    }

    let serialized = serde_json::to_string(&normalized).unwrap_or_default();
    let mut hasher = Sha256::new();
    hasher.update(serialized.as_bytes());
    let digest = hex::encode(hasher.finalize());
    digest[..CONTEXT_HASH_LEN].to_string()
}

/// Recursively rebuild objects with sorted keys
fn sorted(value: &Value) -> Value {
    match value {
        Value::Object(map) => {
            let ordered: BTreeMap<&String, Value> =
                map.iter().map(|(k, v)| (k, sorted(v))).collect();
            let mut out = Map::new();
            for (k, v) in ordered {
                out.insert(k.clone(), v);
            }
            Value::Object(out)
        }
        Value::Array(items) => Value::Array(items.iter().map(sorted).collect()),
        other => other.clone(),
    }
}
