//! Search citations

use crate::core::types::Citation;
use serde_json::Value;

/// Citations kept for one search task
pub const MAX_CITATIONS: usize = 8;

/// Normalise raw search results into numbered citations
pub fn normalize_citations(raw: &[Value]) -> Vec<Citation> {
    raw.iter()
        .take(MAX_CITATIONS)
        .enumerate()
        .map(|(idx, item)| {
            let field = |key: &str| {
                item.get(key)
                    .and_then(Value::as_str)
                    .filter(|s| !s.is_empty())
                    .map(str::to_string)
            };
            let url = field("url");
            Citation {
                index: idx + 1,
                title: field("title")
                    .or_else(|| url.clone())
                    .unwrap_or_else(|| format!("Source {}", idx + 1)),
                url,
                snippet: field("snippet"),
                source: field("source").or_else(|| field("domain")),
            }
        })
        .collect()
}

/// System message listing the sources, `None` when there are none
pub fn sources_block(citations: &[Citation]) -> Option<String> {
    if citations.is_empty() {
        return None;
    }
    let entries: Vec<String> = citations
        .iter()
        .map(|c| {
            format!(
                "[{}] {}\n{}\n{}",
                c.index,
                c.title,
                c.url.as_deref().unwrap_or(""),
                c.snippet.as_deref().unwrap_or("")
            )
        })
        .collect();
    Some(format!("Search sources:\n{}", entries.join("\n\n")))
}
