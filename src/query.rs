//! Ad-hoc semantic queries against an indexed collection.

use anyhow::{Context, Result};

use source_indexer_core::embedding::Embedder;
use source_indexer_core::store::VectorStore;

pub const DEFAULT_TOP_K: usize = 3;
pub const PREVIEW_CHARS: usize = 200;

/// One ranked result.
#[derive(Debug, Clone, PartialEq)]
pub struct QueryHit {
    pub file: String,
    pub preview: String,
    pub score: f32,
}

/// Embed `text` and return the `top_k` closest chunks, best first.
pub async fn query_index(
    embedder: &dyn Embedder,
    store: &dyn VectorStore,
    collection: &str,
    text: &str,
    top_k: usize,
) -> Result<Vec<QueryHit>> {
    let vector = embedder
        .embed(text)
        .await
        .context("Failed to embed query")?;
    let hits = store
        .search(collection, &vector, top_k)
        .await
        .with_context(|| format!("Search in '{}' failed", collection))?;

    Ok(hits
        .into_iter()
        .map(|hit| QueryHit {
            file: hit.payload.file,
            preview: preview(&hit.payload.content),
            score: hit.score,
        })
        .collect())
}

/// First [`PREVIEW_CHARS`] characters, with `...` appended when cut.
pub fn preview(content: &str) -> String {
    let mut chars = content.chars();
    let head: String = chars.by_ref().take(PREVIEW_CHARS).collect();
    if chars.next().is_some() {
        format!("{}...", head)
    } else {
        head
    }
}

/// Print hits the way `srcidx query` shows them.
pub fn print_hits(hits: &[QueryHit]) {
    if hits.is_empty() {
        println!("No results.");
        return;
    }
    for (i, hit) in hits.iter().enumerate() {
        println!("{}. [{:.2}] {}", i + 1, hit.score, hit.file);
        println!("   {}", hit.preview.replace('\n', "\n   "));
        println!();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_preview_short_content_untouched() {
        assert_eq!(preview("fn main() {}"), "fn main() {}");
        assert_eq!(preview(&"a".repeat(200)), "a".repeat(200));
    }

    #[test]
    fn test_preview_truncates_by_chars() {
        let text = "ü".repeat(250);
        let p = preview(&text);
        assert!(p.ends_with("..."));
        assert_eq!(p.chars().count(), 203);
    }
}
