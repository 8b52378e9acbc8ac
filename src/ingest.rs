//! Indexing orchestration.
//!
//! Coordinates one indexing run: scan → chunk → embed → upsert.
//!
//! # Algorithm
//!
//! 1. Ensure the collection exists (created with the embedder's
//!    dimensionality and cosine distance; losing a creation race is fine).
//! 2. Scan the configured roots and config files ([`crate::scanner`]).
//! 3. For each file in order, chunk it and, for each chunk in order,
//!    embed the text, check the vector length, and upsert one point with
//!    the [`ChunkPayload`]. Work is strictly sequential.
//!
//! By default any failure aborts the run. `indexing.max_retries` adds
//! retries with exponential backoff around each embed and upsert call,
//! and `indexing.continue_on_error` records a failing file in
//! [`IndexReport::failed_files`] and moves on to the next one.

use anyhow::{bail, Context, Result};
use std::future::Future;
use std::path::Path;
use std::time::Duration;
use tracing::{debug, info, warn};

use source_indexer_core::chunk::chunk_source_file;
use source_indexer_core::embedding::Embedder;
use source_indexer_core::ids::point_id;
use source_indexer_core::models::{ChunkPayload, EmbeddingRecord, SourceFile};
use source_indexer_core::store::{CollectionStatus, Distance, StoreError, VectorStore};

use crate::config::{IndexingConfig, StoreConfig};
use crate::scanner::scan_sources;

/// Counts from one indexing run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IndexReport {
    pub files_found: usize,
    pub files_indexed: usize,
    pub chunks_indexed: usize,
    /// Relative paths of files skipped under `continue_on_error`.
    pub failed_files: Vec<String>,
}

/// Create the collection unless it is already there.
pub async fn ensure_collection(
    store: &dyn VectorStore,
    collection: &str,
    dims: usize,
) -> Result<CollectionStatus> {
    if dims == 0 {
        bail!("Embedding provider reports 0 dimensions; is embedding.provider disabled?");
    }

    if store.collection_exists(collection).await? {
        info!("Collection '{}' already exists.", collection);
        return Ok(CollectionStatus::AlreadyExists);
    }

    let status = store
        .create_collection(collection, dims, Distance::Cosine)
        .await
        .with_context(|| format!("Failed to create collection '{}'", collection))?;
    match status {
        CollectionStatus::Created => info!("Collection '{}' created.", collection),
        CollectionStatus::AlreadyExists => info!("Collection '{}' already exists.", collection),
    }
    Ok(status)
}

/// Run a full indexing pass over `base_dir`.
pub async fn run_index(
    indexing: &IndexingConfig,
    store_config: &StoreConfig,
    embedder: &dyn Embedder,
    store: &dyn VectorStore,
    base_dir: &Path,
) -> Result<IndexReport> {
    info!("Starting source code indexing...");
    let collection = store_config.collection.as_str();
    ensure_collection(store, collection, embedder.dims()).await?;

    let files = scan_sources(indexing, base_dir)?;
    info!("Found {} source files", files.len());

    let mut report = IndexReport {
        files_found: files.len(),
        ..IndexReport::default()
    };

    for file in &files {
        info!("Processing: {}", file.relative_path);
        match index_file(indexing, collection, embedder, store, file, &mut report).await {
            Ok(()) => report.files_indexed += 1,
            Err(e) if indexing.continue_on_error => {
                warn!(file = %file.relative_path, error = %format!("{:#}", e), "skipping file");
                report.failed_files.push(file.relative_path.clone());
            }
            Err(e) => {
                return Err(e.context(format!("Indexing failed at {}", file.relative_path)));
            }
        }
    }

    info!(
        "Source code indexing complete! Processed {} chunks from {} files.",
        report.chunks_indexed, report.files_found
    );
    Ok(report)
}

/// Scan and chunk without touching any service.
pub fn plan_index(indexing: &IndexingConfig, base_dir: &Path) -> Result<IndexReport> {
    let files = scan_sources(indexing, base_dir)?;
    let options = indexing.chunk_options();
    let chunks_indexed = files
        .iter()
        .map(|file| chunk_source_file(file, &options).len())
        .sum();

    Ok(IndexReport {
        files_found: files.len(),
        files_indexed: 0,
        chunks_indexed,
        failed_files: Vec::new(),
    })
}

async fn index_file(
    indexing: &IndexingConfig,
    collection: &str,
    embedder: &dyn Embedder,
    store: &dyn VectorStore,
    file: &SourceFile,
    report: &mut IndexReport,
) -> Result<()> {
    let chunks = chunk_source_file(file, &indexing.chunk_options());
    if chunks.is_empty() {
        debug!(file = %file.relative_path, "no chunks");
        return Ok(());
    }

    for chunk in &chunks {
        let vector = with_retries("embed", indexing, || embedder.embed(&chunk.text)).await?;
        if vector.len() != embedder.dims() {
            return Err(StoreError::DimensionMismatch {
                collection: collection.to_string(),
                expected: embedder.dims(),
                actual: vector.len(),
            }
            .into());
        }

        let record = EmbeddingRecord {
            id: point_id(
                indexing.id_scheme,
                &file.relative_path,
                chunk.index,
                &chunk.text,
            ),
            vector,
            payload: ChunkPayload::new(file, chunk),
        };
        with_retries("upsert", indexing, || store.upsert(collection, &record)).await?;

        report.chunks_indexed += 1;
        info!(
            "Indexed: {} ({}/{})",
            file.relative_path,
            chunk.index + 1,
            chunk.total_in_file
        );
    }

    Ok(())
}

/// Run `op` once plus up to `max_retries` more times, sleeping
/// `retry_backoff_ms * 2^n` (n capped at 5) between attempts.
async fn with_retries<T, F, Fut>(what: &str, indexing: &IndexingConfig, mut op: F) -> Result<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T>>,
{
    let mut attempt = 0u32;
    loop {
        match op().await {
            Ok(value) => return Ok(value),
            Err(e) if attempt < indexing.max_retries => {
                let delay = retry_delay(indexing.retry_backoff_ms, attempt);
                warn!(
                    attempt = attempt + 1,
                    delay_ms = delay.as_millis() as u64,
                    error = %e,
                    "{} failed, retrying",
                    what
                );
                tokio::time::sleep(delay).await;
                attempt += 1;
            }
            Err(e) => return Err(e.context(format!("{} failed", what))),
        }
    }
}

fn retry_delay(backoff_ms: u64, attempt: u32) -> Duration {
    Duration::from_millis(backoff_ms.saturating_mul(1 << attempt.min(5)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_retry_delay_doubles_and_caps() {
        assert_eq!(retry_delay(500, 0), Duration::from_millis(500));
        assert_eq!(retry_delay(500, 1), Duration::from_millis(1000));
        assert_eq!(retry_delay(500, 3), Duration::from_millis(4000));
        assert_eq!(retry_delay(500, 9), Duration::from_millis(16000));
    }

    #[tokio::test]
    async fn test_with_retries_gives_up_after_budget() {
        let config = IndexingConfig {
            max_retries: 2,
            retry_backoff_ms: 0,
            ..IndexingConfig::default()
        };
        let mut calls = 0;
        let result: Result<()> = with_retries("embed", &config, || {
            calls += 1;
            async { bail!("down") }
        })
        .await;
        assert!(result.is_err());
        assert_eq!(calls, 3);
    }

    #[tokio::test]
    async fn test_with_retries_recovers() {
        let config = IndexingConfig {
            max_retries: 3,
            retry_backoff_ms: 0,
            ..IndexingConfig::default()
        };
        let mut calls = 0;
        let result = with_retries("upsert", &config, || {
            calls += 1;
            let n = calls;
            async move {
                if n < 2 {
                    bail!("flaky")
                }
                Ok(n)
            }
        })
        .await
        .unwrap();
        assert_eq!(result, 2);
    }

    #[tokio::test]
    async fn test_default_is_single_attempt() {
        let config = IndexingConfig::default();
        let mut calls = 0;
        let result: Result<()> = with_retries("embed", &config, || {
            calls += 1;
            async { bail!("down") }
        })
        .await;
        assert!(result.is_err());
        assert_eq!(calls, 1);
    }
}
