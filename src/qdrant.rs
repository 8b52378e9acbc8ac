//! Qdrant [`VectorStore`] over the REST API.
//!
//! | Operation | Request |
//! |-----------|---------|
//! | `collection_exists` | `GET /collections` |
//! | `create_collection` | `PUT /collections/{name}` |
//! | `upsert` | `PUT /collections/{name}/points?wait=true` |
//! | `search` | `POST /collections/{name}/points/search` |
//!
//! When `store.api_key_env` names a set environment variable, its value
//! is sent as the `api-key` header on every request.

use anyhow::{anyhow, bail, Context, Result};
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue};
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use source_indexer_core::models::{ChunkPayload, EmbeddingRecord, SearchHit};
use source_indexer_core::store::{CollectionStatus, Distance, StoreError, VectorStore};

use crate::config::StoreConfig;

pub struct QdrantStore {
    client: reqwest::Client,
    base_url: String,
}

impl QdrantStore {
    pub fn new(config: &StoreConfig) -> Result<Self> {
        let api_key = config
            .api_key_env
            .as_deref()
            .and_then(|name| std::env::var(name).ok())
            .filter(|key| !key.trim().is_empty());
        Self::with_api_key(config, api_key.as_deref())
    }

    pub fn with_api_key(config: &StoreConfig, api_key: Option<&str>) -> Result<Self> {
        let mut headers = HeaderMap::new();
        if let Some(key) = api_key {
            headers.insert(
                "api-key",
                HeaderValue::from_str(key.trim()).context("invalid Qdrant API key")?,
            );
        }

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .default_headers(headers)
            .build()
            .context("failed to build Qdrant HTTP client")?;

        Ok(Self {
            client,
            base_url: config.url.trim_end_matches('/').to_string(),
        })
    }

    fn collection_url(&self, name: &str) -> String {
        format!("{}/collections/{}", self.base_url, name)
    }
}

#[derive(Deserialize)]
struct Envelope<T> {
    result: T,
}

#[derive(Deserialize)]
struct CollectionList {
    collections: Vec<CollectionDescription>,
}

#[derive(Deserialize)]
struct CollectionDescription {
    name: String,
}

#[derive(Serialize)]
struct CreateCollection {
    vectors: VectorParams,
}

#[derive(Serialize)]
struct VectorParams {
    size: usize,
    distance: Distance,
}

#[derive(Serialize)]
struct UpsertPoints<'a> {
    points: [Point<'a>; 1],
}

#[derive(Serialize)]
struct Point<'a> {
    id: &'a str,
    vector: &'a [f32],
    payload: &'a ChunkPayload,
}

#[derive(Serialize)]
struct SearchRequest<'a> {
    vector: &'a [f32],
    limit: usize,
    with_payload: bool,
}

#[derive(Deserialize)]
struct ScoredPoint {
    id: serde_json::Value,
    score: f32,
    payload: ChunkPayload,
}

/// Status and body of a failed call, for error messages.
async fn failure(response: reqwest::Response) -> (StatusCode, String) {
    let status = response.status();
    let body = response
        .text()
        .await
        .unwrap_or_else(|_| "<body unavailable>".to_string());
    (status, body)
}

#[async_trait]
impl VectorStore for QdrantStore {
    async fn collection_exists(&self, name: &str) -> Result<bool> {
        let response = self
            .client
            .get(format!("{}/collections", self.base_url))
            .send()
            .await
            .with_context(|| format!("Failed to reach Qdrant at {}", self.base_url))?;

        if !response.status().is_success() {
            let (status, body) = failure(response).await;
            bail!("Qdrant list collections failed ({}): {}", status, body);
        }

        let list: Envelope<CollectionList> = response
            .json()
            .await
            .context("failed to parse Qdrant collection list")?;
        Ok(list.result.collections.iter().any(|c| c.name == name))
    }

    async fn create_collection(
        &self,
        name: &str,
        dims: usize,
        distance: Distance,
    ) -> Result<CollectionStatus> {
        let request = CreateCollection {
            vectors: VectorParams {
                size: dims,
                distance,
            },
        };
        let response = self
            .client
            .put(self.collection_url(name))
            .json(&request)
            .send()
            .await
            .with_context(|| format!("Failed to reach Qdrant at {}", self.base_url))?;

        if response.status().is_success() {
            return Ok(CollectionStatus::Created);
        }

        let (status, body) = failure(response).await;
        if status == StatusCode::CONFLICT || body.contains("already exists") {
            return Ok(CollectionStatus::AlreadyExists);
        }
        bail!("Qdrant create collection '{}' failed ({}): {}", name, status, body)
    }

    async fn upsert(&self, collection: &str, record: &EmbeddingRecord) -> Result<()> {
        let request = UpsertPoints {
            points: [Point {
                id: &record.id,
                vector: &record.vector,
                payload: &record.payload,
            }],
        };
        let response = self
            .client
            .put(format!("{}/points?wait=true", self.collection_url(collection)))
            .json(&request)
            .send()
            .await
            .with_context(|| format!("Failed to reach Qdrant at {}", self.base_url))?;

        if response.status().is_success() {
            return Ok(());
        }

        let (status, body) = failure(response).await;
        if status == StatusCode::NOT_FOUND {
            return Err(StoreError::CollectionNotFound(collection.to_string()).into());
        }
        bail!("Qdrant upsert into '{}' failed ({}): {}", collection, status, body)
    }

    async fn search(
        &self,
        collection: &str,
        vector: &[f32],
        top_k: usize,
    ) -> Result<Vec<SearchHit>> {
        let request = SearchRequest {
            vector,
            limit: top_k,
            with_payload: true,
        };
        let response = self
            .client
            .post(format!("{}/points/search", self.collection_url(collection)))
            .json(&request)
            .send()
            .await
            .with_context(|| format!("Failed to reach Qdrant at {}", self.base_url))?;

        if !response.status().is_success() {
            let (status, body) = failure(response).await;
            if status == StatusCode::NOT_FOUND {
                return Err(StoreError::CollectionNotFound(collection.to_string()).into());
            }
            bail!("Qdrant search in '{}' failed ({}): {}", collection, status, body);
        }

        let scored: Envelope<Vec<ScoredPoint>> = response
            .json()
            .await
            .map_err(|e| anyhow!("failed to parse Qdrant search response: {}", e))?;

        Ok(scored
            .result
            .into_iter()
            .map(|point| SearchHit {
                id: match point.id {
                    serde_json::Value::String(s) => s,
                    other => other.to_string(),
                },
                score: point.score,
                payload: point.payload,
            })
            .collect())
    }
}
