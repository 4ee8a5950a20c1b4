//! Default context rendering

use super::ContextBuilder;
use crate::utils::{truncate_chars, truncate_with_ellipsis};
use serde_json::Value;

const SECTION_SEPARATOR: &str = "\n\n---\n\n";

/// Per-section limits
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ContextLimits {
    pub max_memories: usize,
    pub max_chars_per_memory: usize,
    pub max_runs: usize,
    pub max_chars_per_run: usize,
    pub max_documents: usize,
    pub max_chars_per_document: usize,
}

impl Default for ContextLimits {
    fn default() -> Self {
        Self {
            max_memories: 5,
            max_chars_per_memory: 300,
            max_runs: 3,
            max_chars_per_run: 150,
            max_documents: 5,
            max_chars_per_document: 2000,
        }
    }
}

/// Renders memories, recent agent runs, the active tab, documents and free-form context
#[derive(Debug, Clone, Default)]
pub struct DefaultContextBuilder {
    limits: ContextLimits,
}

impl DefaultContextBuilder {
    pub fn new(limits: ContextLimits) -> Self {
        Self { limits }
    }

    fn memories(&self, memories: &[Value]) -> Option<String> {
        let lines: Vec<String> = memories
            .iter()
            .take(self.limits.max_memories)
            .map(|memory| {
                let metadata = memory.get("metadata");
                let url = metadata.and_then(|m| str_field(m, "url"));
                let title = metadata
                    .and_then(|m| str_field(m, "title"))
                    .or(url)
                    .unwrap_or("Memory");
                let value = match memory.get("value") {
                    Some(Value::String(s)) => {
                        truncate_with_ellipsis(s, self.limits.max_chars_per_memory)
                    }
                    Some(Value::Null) | None => String::new(),
                    Some(other) => {
                        truncate_chars(&other.to_string(), self.limits.max_chars_per_memory)
                            .to_string()
                    }
                };
                match url {
                    Some(url) => format!("- {} ({})\n  {}", title, url, value),
                    None => format!("- {}\n  {}", title, value),
                }
            })
            .collect();

        non_empty(lines).map(|lines| format!("Relevant memories:\n{}", lines.join("\n\n")))
    }

    fn agent_runs(&self, runs: &[Value]) -> Option<String> {
        let max = self.limits.max_chars_per_run;
        let lines: Vec<String> = runs
            .iter()
            .take(self.limits.max_runs)
            .filter_map(|run| {
                let response = str_field(run, "response")?;
                let prompt = truncate_chars(str_field(run, "prompt").unwrap_or(""), max);
                let status = if run.get("success").and_then(Value::as_bool).unwrap_or(false) {
                    "✓"
                } else {
                    "✗"
                };
                Some(format!(
                    "{} Q: {}\n  A: {}",
                    status,
                    prompt,
                    truncate_with_ellipsis(response, max)
                ))
            })
            .collect();

        non_empty(lines).map(|lines| format!("Recent interactions:\n{}", lines.join("\n")))
    }

    fn active_tab(&self, tab: &Value) -> Option<String> {
        let mut parts = Vec::new();
        if let Some(title) = str_field(tab, "title") {
            parts.push(format!("Page: {}", title));
        }
        if let Some(url) = str_field(tab, "url") {
            parts.push(format!("URL: {}", url));
        }
        non_empty(parts).map(|parts| format!("Current page:\n{}", parts.join("\n")))
    }

    fn documents(&self, documents: &[Value]) -> Option<String> {
        let max = self.limits.max_chars_per_document;
        let blocks: Vec<String> = documents
            .iter()
            .take(self.limits.max_documents)
            .map(|doc| {
                let name = str_field(doc, "name").unwrap_or("Untitled");
                let doc_type = str_field(doc, "type").unwrap_or("unknown");
                let text = match doc.get("text") {
                    Some(Value::String(s)) => truncate_with_ellipsis(s, max),
                    Some(Value::Null) | None => String::new(),
                    Some(other) => truncate_chars(&other.to_string(), max).to_string(),
                };
                format!("Document: {} ({})\n{}", name, doc_type, text)
            })
            .collect();

        non_empty(blocks)
            .map(|blocks| format!("Uploaded documents:\n{}", blocks.join(SECTION_SEPARATOR)))
    }
}

impl ContextBuilder for DefaultContextBuilder {
    fn enhance(&self, context: &Value) -> String {
        let Some(map) = context.as_object() else {
            return String::new();
        };
        let field = |primary: &str, alias: &str| {
            map.get(primary)
                .filter(|v| is_present(v))
                .or_else(|| map.get(alias).filter(|v| is_present(v)))
        };

        let mut sections = Vec::new();

        if let Some(memories) = field("memories", "memory").and_then(Value::as_array) {
            sections.extend(self.memories(memories));
        }
        if let Some(runs) = field("agent_runs", "runs").and_then(Value::as_array) {
            sections.extend(self.agent_runs(runs));
        }
        if let Some(tab) = field("active_tab", "tab") {
            sections.extend(self.active_tab(tab));
        }
        if let Some(documents) = field("documents", "documents").and_then(Value::as_array) {
            sections.extend(self.documents(documents));
        }
        match field("custom", "additional") {
            Some(Value::String(text)) => sections.push(text.clone()),
            Some(value @ Value::Object(_)) => sections.push(value.to_string()),
            _ => {}
        }

        if sections.is_empty() {
            return String::new();
        }
        format!("\n\n{}\n\n", sections.join(SECTION_SEPARATOR))
    }
}

/// Rough token count, four characters per token
pub fn estimate_context_tokens(context: &str) -> usize {
    context.chars().count() / 4
}

fn str_field<'a>(value: &'a Value, key: &str) -> Option<&'a str> {
    value
        .get(key)
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
}

fn is_present(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::String(s) => !s.is_empty(),
        Value::Array(a) => !a.is_empty(),
        Value::Object(o) => !o.is_empty(),
        Value::Number(_) => true,
    }
}

fn non_empty(items: Vec<String>) -> Option<Vec<String>> {
    if items.is_empty() { None } else { Some(items) }
}
