//! Embedding provider implementations.
//!
//! Concrete [`Embedder`]s selected by `embedding.provider`:
//! - **[`DisabledProvider`]**: always errors; lets `srcidx chunk` and dry
//!   runs work without any model.
//! - **[`LocalProvider`]**: runs a sentence-embedding model in-process via
//!   fastembed. The model is loaded on first use and kept for the life of
//!   the provider. Requires the `local-embeddings` feature.
//! - **[`OllamaProvider`]**: `POST {url}/api/embed` on an Ollama instance.
//! - **[`OpenAIProvider`]**: `POST /v1/embeddings`, key from `OPENAI_API_KEY`.
//!
//! Every provider returns unit-length vectors and makes exactly one
//! attempt per call. Retrying is the caller's decision (see
//! [`crate::ingest`]).
//!
//! # Provider Selection
//!
//! ```rust,no_run
//! # use source_indexer::config::EmbeddingConfig;
//! # use source_indexer::embedding::create_provider;
//! let config = EmbeddingConfig {
//!     provider: "disabled".to_string(),
//!     ..EmbeddingConfig::default()
//! };
//! let provider = create_provider(&config).unwrap();
//! assert_eq!(provider.model_name(), "disabled");
//! ```

use anyhow::{anyhow, bail, Context, Result};
use async_trait::async_trait;
use std::time::Duration;

use source_indexer_core::embedding::{l2_normalize, Embedder};

use crate::config::EmbeddingConfig;

const DEFAULT_LOCAL_MODEL: &str = "all-minilm-l6-v2";
const DEFAULT_OLLAMA_URL: &str = "http://localhost:11434";
const DEFAULT_OPENAI_URL: &str = "https://api.openai.com";

// ============ Disabled Provider ============

/// Provider used when `embedding.provider = "disabled"`.
pub struct DisabledProvider;

#[async_trait]
impl Embedder for DisabledProvider {
    fn model_name(&self) -> &str {
        "disabled"
    }
    fn dims(&self) -> usize {
        0
    }
    async fn embed(&self, _text: &str) -> Result<Vec<f32>> {
        bail!("Embedding provider is disabled")
    }
}

// ============ Local Provider (fastembed) ============

/// In-process embedding via fastembed.
///
/// Models are downloaded from Hugging Face on first use and cached; after
/// that no network is needed. Inference runs on tokio's blocking pool.
#[cfg(feature = "local-embeddings")]
pub struct LocalProvider {
    model_name: String,
    dims: usize,
    model: fastembed::EmbeddingModel,
    loaded: std::sync::Arc<std::sync::Mutex<Option<fastembed::TextEmbedding>>>,
}

#[cfg(feature = "local-embeddings")]
impl LocalProvider {
    pub fn new(config: &EmbeddingConfig) -> Result<Self> {
        let (model_name, dims) = resolve_local_model(config);
        let model = config_to_fastembed_model(&model_name)?;
        Ok(Self {
            model_name,
            dims,
            model,
            loaded: std::sync::Arc::new(std::sync::Mutex::new(None)),
        })
    }
}

#[cfg(feature = "local-embeddings")]
#[async_trait]
impl Embedder for LocalProvider {
    fn model_name(&self) -> &str {
        &self.model_name
    }
    fn dims(&self) -> usize {
        self.dims
    }

    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        let loaded = self.loaded.clone();
        let model = self.model.clone();
        let text = text.to_string();

        let mut vector = tokio::task::spawn_blocking(move || -> Result<Vec<f32>> {
            let mut guard = loaded
                .lock()
                .map_err(|_| anyhow!("local embedding model lock poisoned"))?;
            if guard.is_none() {
                tracing::info!("Loading local embedding model...");
                let embedding = fastembed::TextEmbedding::try_new(
                    fastembed::InitOptions::new(model).with_show_download_progress(true),
                )
                .map_err(|e| anyhow!("Failed to initialize local embedding model: {}", e))?;
                *guard = Some(embedding);
            }
            let embedding = guard
                .as_mut()
                .ok_or_else(|| anyhow!("local embedding model not loaded"))?;

            embedding
                .embed(vec![text], None)
                .map_err(|e| anyhow!("Local embedding failed: {}", e))?
                .into_iter()
                .next()
                .ok_or_else(|| anyhow!("Local embedding returned no vector"))
        })
        .await??;

        l2_normalize(&mut vector);
        Ok(vector)
    }
}

/// Model name and dimensionality for the local provider.
pub fn resolve_local_model(config: &EmbeddingConfig) -> (String, usize) {
    let model_name = config
        .model
        .clone()
        .unwrap_or_else(|| DEFAULT_LOCAL_MODEL.to_string());

    let dims = config.dims.unwrap_or(match model_name.as_str() {
        "all-minilm-l6-v2" => 384,
        "bge-small-en-v1.5" => 384,
        "bge-base-en-v1.5" => 768,
        "bge-large-en-v1.5" => 1024,
        "nomic-embed-text-v1" | "nomic-embed-text-v1.5" => 768,
        _ => 384,
    });

    (model_name, dims)
}

#[cfg(feature = "local-embeddings")]
fn config_to_fastembed_model(name: &str) -> Result<fastembed::EmbeddingModel> {
    match name {
        "all-minilm-l6-v2" => Ok(fastembed::EmbeddingModel::AllMiniLML6V2),
        "bge-small-en-v1.5" => Ok(fastembed::EmbeddingModel::BGESmallENV15),
        "bge-base-en-v1.5" => Ok(fastembed::EmbeddingModel::BGEBaseENV15),
        "bge-large-en-v1.5" => Ok(fastembed::EmbeddingModel::BGELargeENV15),
        "nomic-embed-text-v1" => Ok(fastembed::EmbeddingModel::NomicEmbedTextV1),
        "nomic-embed-text-v1.5" => Ok(fastembed::EmbeddingModel::NomicEmbedTextV15),
        other => bail!(
            "Unknown local embedding model: '{}'. Supported models: \
             all-minilm-l6-v2, bge-small-en-v1.5, bge-base-en-v1.5, bge-large-en-v1.5, \
             nomic-embed-text-v1, nomic-embed-text-v1.5",
            other
        ),
    }
}

// ============ Ollama Provider ============

/// Embedding via a running Ollama instance (default `http://localhost:11434`).
pub struct OllamaProvider {
    model: String,
    dims: usize,
    url: String,
    client: reqwest::Client,
}

impl OllamaProvider {
    pub fn new(config: &EmbeddingConfig) -> Result<Self> {
        let model = config
            .model
            .clone()
            .ok_or_else(|| anyhow!("embedding.model required for Ollama provider"))?;
        let dims = config
            .dims
            .ok_or_else(|| anyhow!("embedding.dims required for Ollama provider"))?;
        let url = config
            .url
            .clone()
            .unwrap_or_else(|| DEFAULT_OLLAMA_URL.to_string());

        Ok(Self {
            model,
            dims,
            url: url.trim_end_matches('/').to_string(),
            client: build_client(config.timeout_secs)?,
        })
    }
}

#[async_trait]
impl Embedder for OllamaProvider {
    fn model_name(&self) -> &str {
        &self.model
    }
    fn dims(&self) -> usize {
        self.dims
    }

    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        let body = serde_json::json!({
            "model": self.model,
            "input": [text],
        });

        let response = self
            .client
            .post(format!("{}/api/embed", self.url))
            .json(&body)
            .send()
            .await
            .with_context(|| format!("Ollama connection error (is Ollama running at {}?)", self.url))?;

        let status = response.status();
        if !status.is_success() {
            let body_text = response.text().await.unwrap_or_default();
            bail!("Ollama API error {}: {}", status, body_text);
        }

        let json: serde_json::Value = response.json().await?;
        let mut vector = parse_ollama_response(&json)?;
        l2_normalize(&mut vector);
        Ok(vector)
    }
}

fn parse_ollama_response(json: &serde_json::Value) -> Result<Vec<f32>> {
    let first = json
        .get("embeddings")
        .and_then(|e| e.as_array())
        .and_then(|e| e.first())
        .ok_or_else(|| anyhow!("Invalid Ollama response: missing embeddings array"))?;

    number_array(first).ok_or_else(|| anyhow!("Invalid Ollama response: embedding is not an array"))
}

// ============ OpenAI Provider ============

/// Embedding via the OpenAI API. Requires `OPENAI_API_KEY`.
pub struct OpenAIProvider {
    model: String,
    dims: usize,
    url: String,
    api_key: String,
    client: reqwest::Client,
}

impl OpenAIProvider {
    pub fn new(config: &EmbeddingConfig) -> Result<Self> {
        let model = config
            .model
            .clone()
            .ok_or_else(|| anyhow!("embedding.model required for OpenAI provider"))?;
        let dims = config
            .dims
            .ok_or_else(|| anyhow!("embedding.dims required for OpenAI provider"))?;
        let api_key = std::env::var("OPENAI_API_KEY")
            .map_err(|_| anyhow!("OPENAI_API_KEY environment variable not set"))?;
        let url = config
            .url
            .clone()
            .unwrap_or_else(|| DEFAULT_OPENAI_URL.to_string());

        Ok(Self {
            model,
            dims,
            url: url.trim_end_matches('/').to_string(),
            api_key,
            client: build_client(config.timeout_secs)?,
        })
    }
}

#[async_trait]
impl Embedder for OpenAIProvider {
    fn model_name(&self) -> &str {
        &self.model
    }
    fn dims(&self) -> usize {
        self.dims
    }

    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        let body = serde_json::json!({
            "model": self.model,
            "input": [text],
        });

        let response = self
            .client
            .post(format!("{}/v1/embeddings", self.url))
            .header("Authorization", format!("Bearer {}", self.api_key))
            .json(&body)
            .send()
            .await
            .context("OpenAI request failed")?;

        let status = response.status();
        if !status.is_success() {
            let body_text = response.text().await.unwrap_or_default();
            bail!("OpenAI API error {}: {}", status, body_text);
        }

        let json: serde_json::Value = response.json().await?;
        let mut vector = parse_openai_response(&json)?;
        l2_normalize(&mut vector);
        Ok(vector)
    }
}

fn parse_openai_response(json: &serde_json::Value) -> Result<Vec<f32>> {
    let first = json
        .get("data")
        .and_then(|d| d.as_array())
        .and_then(|d| d.first())
        .ok_or_else(|| anyhow!("Invalid OpenAI response: missing data array"))?;

    first
        .get("embedding")
        .and_then(number_array)
        .ok_or_else(|| anyhow!("Invalid OpenAI response: missing embedding"))
}

fn number_array(value: &serde_json::Value) -> Option<Vec<f32>> {
    value
        .as_array()
        .and_then(|items| items.iter().map(|v| v.as_f64().map(|f| f as f32)).collect())
}

fn build_client(timeout_secs: u64) -> Result<reqwest::Client> {
    Ok(reqwest::Client::builder()
        .timeout(Duration::from_secs(timeout_secs))
        .build()?)
}

/// Create the [`Embedder`] named by `embedding.provider`.
///
/// | Config Value | Provider |
/// |-------------|----------|
/// | `"disabled"` | [`DisabledProvider`] |
/// | `"local"` | `LocalProvider` (needs the `local-embeddings` feature) |
/// | `"ollama"` | [`OllamaProvider`] |
/// | `"openai"` | [`OpenAIProvider`] |
pub fn create_provider(config: &EmbeddingConfig) -> Result<Box<dyn Embedder>> {
    match config.provider.as_str() {
        "disabled" => Ok(Box::new(DisabledProvider)),
        "ollama" => Ok(Box::new(OllamaProvider::new(config)?)),
        "openai" => Ok(Box::new(OpenAIProvider::new(config)?)),
        #[cfg(feature = "local-embeddings")]
        "local" => Ok(Box::new(LocalProvider::new(config)?)),
        #[cfg(not(feature = "local-embeddings"))]
        "local" => bail!("Local embedding provider requires --features local-embeddings"),
        other => bail!("Unknown embedding provider: {}", other),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ollama_config(url: &str) -> EmbeddingConfig {
        EmbeddingConfig {
            provider: "ollama".to_string(),
            model: Some("nomic-embed-text".to_string()),
            dims: Some(3),
            url: Some(url.to_string()),
            timeout_secs: 5,
        }
    }

    #[tokio::test]
    async fn test_disabled_provider_errors() {
        let provider = DisabledProvider;
        let err = provider.embed("hello").await.unwrap_err();
        assert!(err.to_string().contains("disabled"));
    }

    #[test]
    fn test_create_provider_unknown() {
        let config = EmbeddingConfig {
            provider: "magic".to_string(),
            ..EmbeddingConfig::default()
        };
        assert!(create_provider(&config).is_err());
    }

    #[test]
    fn test_resolve_local_model_defaults() {
        let (name, dims) = resolve_local_model(&EmbeddingConfig::default());
        assert_eq!(name, "all-minilm-l6-v2");
        assert_eq!(dims, 384);

        let config = EmbeddingConfig {
            model: Some("bge-base-en-v1.5".to_string()),
            ..EmbeddingConfig::default()
        };
        assert_eq!(resolve_local_model(&config).1, 768);
    }

    #[tokio::test]
    async fn test_ollama_embed_is_normalized() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/api/embed")
            .match_body(mockito::Matcher::PartialJson(serde_json::json!({
                "model": "nomic-embed-text",
                "input": ["hello"],
            })))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"embeddings":[[3.0,4.0,0.0]]}"#)
            .create_async()
            .await;

        let provider = OllamaProvider::new(&ollama_config(&server.url())).unwrap();
        let vector = provider.embed("hello").await.unwrap();
        assert!((vector[0] - 0.6).abs() < 1e-6);
        assert!((vector[1] - 0.8).abs() < 1e-6);
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_ollama_error_is_single_attempt() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/api/embed")
            .with_status(503)
            .with_body("loading")
            .expect(1)
            .create_async()
            .await;

        let provider = OllamaProvider::new(&ollama_config(&server.url())).unwrap();
        let err = provider.embed("hello").await.unwrap_err();
        assert!(err.to_string().contains("503"));
        mock.assert_async().await;
    }

    #[test]
    fn test_parse_openai_response() {
        let json = serde_json::json!({
            "data": [{"index": 0, "embedding": [0.5, 0.25]}]
        });
        assert_eq!(parse_openai_response(&json).unwrap(), vec![0.5, 0.25]);
        assert!(parse_openai_response(&serde_json::json!({"data": []})).is_err());
    }

    #[test]
    fn test_parse_ollama_response_rejects_garbage() {
        assert!(parse_ollama_response(&serde_json::json!({"embeddings": "nope"})).is_err());
        assert!(parse_ollama_response(&serde_json::json!({"embeddings": [7]})).is_err());
    }

    #[test]
    fn test_non_numeric_element_is_rejected() {
        let ollama = serde_json::json!({"embeddings": [[0.5, "oops", 0.25]]});
        assert!(parse_ollama_response(&ollama).is_err());

        let openai = serde_json::json!({"data": [{"embedding": [0.5, null]}]});
        assert!(parse_openai_response(&openai).is_err());
    }
}
