//! Prompt enrichment
//!
//! Turns the caller's structured context blob into a text block for the
//! model, and fetches citations for search tasks.

mod builder;
mod citations;


pub use builder::{ContextLimits, DefaultContextBuilder, estimate_context_tokens};
pub use citations::{MAX_CITATIONS, normalize_citations, sources_block};

use crate::utils::error::Result;
use async_trait::async_trait;
use serde_json::Value;

/// Renders a context blob into prompt text
pub trait ContextBuilder: Send + Sync {
    /// Text block for the model, empty when nothing useful is present
    fn enhance(&self, context: &Value) -> String;
}

/// Builder that never adds context
#[derive(Debug, Default, Clone, Copy)]
pub struct NoContext;

impl ContextBuilder for NoContext {
    fn enhance(&self, _context: &Value) -> String {
        String::new()
    }
}

/// Source of raw search results for search tasks
#[async_trait]
pub trait CitationSource: Send + Sync {
    /// Raw result objects with `title`, `url`, `snippet`, `source` or `domain` fields
    async fn lookup(&self, query: &str, max_results: usize) -> Result<Vec<Value>>;
}
