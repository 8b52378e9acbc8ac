//! In-memory [`VectorStore`] implementation for testing and embedding
//! the library without a running vector database.
//!
//! Uses `HashMap`s behind `std::sync::RwLock` for thread safety.
//! Search is brute-force scoring over every stored vector.

use std::collections::HashMap;
use std::sync::{PoisonError, RwLock};

use anyhow::{anyhow, Result};
use async_trait::async_trait;

use crate::embedding::{cosine_similarity, dot_product, euclidean_distance};
use crate::models::{EmbeddingRecord, SearchHit};

use super::{CollectionStatus, Distance, StoreError, VectorStore};

struct Collection {
    dims: usize,
    distance: Distance,
    /// Keyed by point id; upserting an existing id replaces it.
    points: HashMap<String, EmbeddingRecord>,
}

/// In-memory store for tests.
pub struct InMemoryStore {
    collections: RwLock<HashMap<String, Collection>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self {
            collections: RwLock::new(HashMap::new()),
        }
    }

    /// Number of points in `collection`, or `None` if it does not exist.
    pub fn len(&self, collection: &str) -> Option<usize> {
        self.collections
            .read()
            .ok()?
            .get(collection)
            .map(|c| c.points.len())
    }

    /// Dimensionality and metric of `collection`.
    pub fn collection_info(&self, collection: &str) -> Option<(usize, Distance)> {
        self.collections
            .read()
            .ok()?
            .get(collection)
            .map(|c| (c.dims, c.distance))
    }

    /// All records of `collection`, in no particular order.
    pub fn records(&self, collection: &str) -> Vec<EmbeddingRecord> {
        self.collections
            .read()
            .ok()
            .and_then(|guard| {
                guard
                    .get(collection)
                    .map(|c| c.points.values().cloned().collect())
            })
            .unwrap_or_default()
    }
}

impl Default for InMemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

fn poisoned<T>(_: PoisonError<T>) -> anyhow::Error {
    anyhow!("in-memory store lock poisoned")
}

fn score(distance: Distance, query: &[f32], vector: &[f32]) -> f32 {
    match distance {
        Distance::Cosine => cosine_similarity(query, vector),
        Distance::Dot => dot_product(query, vector),
        // Higher is better everywhere, so negate the distance.
        Distance::Euclid => -euclidean_distance(query, vector),
    }
}

#[async_trait]
impl VectorStore for InMemoryStore {
    async fn collection_exists(&self, name: &str) -> Result<bool> {
        let collections = self.collections.read().map_err(poisoned)?;
        Ok(collections.contains_key(name))
    }

    async fn create_collection(
        &self,
        name: &str,
        dims: usize,
        distance: Distance,
    ) -> Result<CollectionStatus> {
        let mut collections = self.collections.write().map_err(poisoned)?;
        if collections.contains_key(name) {
            return Ok(CollectionStatus::AlreadyExists);
        }
        collections.insert(
            name.to_string(),
            Collection {
                dims,
                distance,
                points: HashMap::new(),
            },
        );
        Ok(CollectionStatus::Created)
    }

    async fn upsert(&self, collection: &str, record: &EmbeddingRecord) -> Result<()> {
        let mut collections = self.collections.write().map_err(poisoned)?;
        let target = collections
            .get_mut(collection)
            .ok_or_else(|| StoreError::CollectionNotFound(collection.to_string()))?;

        if record.vector.len() != target.dims {
            return Err(StoreError::DimensionMismatch {
                collection: collection.to_string(),
                expected: target.dims,
                actual: record.vector.len(),
            }
            .into());
        }

        target.points.insert(record.id.clone(), record.clone());
        Ok(())
    }

    async fn search(
        &self,
        collection: &str,
        vector: &[f32],
        top_k: usize,
    ) -> Result<Vec<SearchHit>> {
        let collections = self.collections.read().map_err(poisoned)?;
        let target = collections
            .get(collection)
            .ok_or_else(|| StoreError::CollectionNotFound(collection.to_string()))?;

        if vector.len() != target.dims {
            return Err(StoreError::DimensionMismatch {
                collection: collection.to_string(),
                expected: target.dims,
                actual: vector.len(),
            }
            .into());
        }

        let mut hits: Vec<SearchHit> = target
            .points
            .values()
            .map(|record| SearchHit {
                id: record.id.clone(),
                score: score(target.distance, vector, &record.vector),
                payload: record.payload.clone(),
            })
            .collect();
        hits.sort_by(|a, b| {
            b.score
                .partial_cmp(&a.score)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        hits.truncate(top_k);
        Ok(hits)
    }
}
