//! Vector store abstraction for Source Indexer.
//!
//! The [`VectorStore`] trait covers the four operations the indexing
//! pipeline and the query helper need from a similarity-search service,
//! enabling pluggable backends (Qdrant over REST, in-memory for tests).
//!
//! Implementations must be `Send + Sync` to work with async runtimes.

pub mod memory;

use anyhow::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::models::{EmbeddingRecord, SearchHit};

/// Similarity metric of a collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Distance {
    Cosine,
    Dot,
    Euclid,
}

/// Outcome of [`VectorStore::create_collection`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CollectionStatus {
    Created,
    /// Another writer created it first. Treated as success.
    AlreadyExists,
}

/// Store failures callers may want to match on.
#[derive(Debug, Error, PartialEq)]
pub enum StoreError {
    #[error("collection '{0}' does not exist")]
    CollectionNotFound(String),

    #[error("vector dimension mismatch for collection '{collection}': expected {expected}, got {actual}")]
    DimensionMismatch {
        collection: String,
        expected: usize,
        actual: usize,
    },
}

/// Abstract similarity-search backend.
///
/// # Operations
///
/// | Method | Purpose |
/// |--------|---------|
/// | [`collection_exists`](VectorStore::collection_exists) | Check for a named collection |
/// | [`create_collection`](VectorStore::create_collection) | Create a collection with fixed dims and metric |
/// | [`upsert`](VectorStore::upsert) | Write one record |
/// | [`search`](VectorStore::search) | Top-k nearest records for a vector |
#[async_trait]
pub trait VectorStore: Send + Sync {
    async fn collection_exists(&self, name: &str) -> Result<bool>;

    async fn create_collection(
        &self,
        name: &str,
        dims: usize,
        distance: Distance,
    ) -> Result<CollectionStatus>;

    async fn upsert(&self, collection: &str, record: &EmbeddingRecord) -> Result<()>;

    /// Ranked best-first.
    async fn search(&self, collection: &str, vector: &[f32], top_k: usize)
        -> Result<Vec<SearchHit>>;
}
