//! TOML configuration.
//!
//! Every section and field is optional; an empty file (or no file at
//! all) yields the defaults, which index the usual JS/TS monorepo layout
//! into a local Qdrant with a 384-dim MiniLM model.
//!
//! ```toml
//! [store]
//! url = "http://localhost:6333"
//! collection = "source-code"
//!
//! [embedding]
//! provider = "local"
//! model = "all-minilm-l6-v2"
//! dims = 384
//!
//! [indexing]
//! roots = ["src", "."]
//! max_chunk_chars = 800
//! id_scheme = "random"
//!
//! [logging]
//! level = "info"
//! ```

use anyhow::{bail, Context, Result};
use serde::Deserialize;
use std::path::Path;

use source_indexer_core::chunk::{ChunkOptions, DEFAULT_MAX_CHARS, DEFAULT_MIN_CHARS};
use source_indexer_core::ids::IdScheme;

#[derive(Debug, Deserialize, Clone, Default)]
#[serde(default)]
pub struct Config {
    pub store: StoreConfig,
    pub embedding: EmbeddingConfig,
    pub indexing: IndexingConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct StoreConfig {
    pub url: String,
    pub collection: String,
    /// Name of the env var holding the Qdrant API key, if any.
    pub api_key_env: Option<String>,
    pub timeout_secs: u64,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            url: "http://localhost:6333".to_string(),
            collection: "source-code".to_string(),
            api_key_env: Some("QDRANT_API_KEY".to_string()),
            timeout_secs: 30,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct EmbeddingConfig {
    /// `local`, `ollama`, `openai` or `disabled`.
    pub provider: String,
    pub model: Option<String>,
    pub dims: Option<usize>,
    /// Base URL for the `ollama` provider.
    pub url: Option<String>,
    pub timeout_secs: u64,
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            provider: "local".to_string(),
            model: None,
            dims: None,
            url: None,
            timeout_secs: 30,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct IndexingConfig {
    /// Directories walked recursively. Missing ones are skipped.
    pub roots: Vec<String>,
    /// Individual files indexed when present, relative to the base dir.
    pub config_files: Vec<String>,
    pub include_extensions: Vec<String>,
    /// Directory names never descended into (hidden dirs are always skipped).
    pub exclude_dirs: Vec<String>,
    pub exclude_globs: Vec<String>,
    pub max_file_chars: usize,
    pub max_chunk_chars: usize,
    pub min_chunk_chars: usize,
    pub id_scheme: IdScheme,
    /// Extra attempts per embed/upsert call. `0` means one attempt.
    pub max_retries: u32,
    pub retry_backoff_ms: u64,
    /// Log and skip a failing file instead of aborting the run.
    pub continue_on_error: bool,
}

impl Default for IndexingConfig {
    fn default() -> Self {
        Self {
            roots: vec![
                "apps/code-helper-ui/src".to_string(),
                "libs/code-helper-core/src".to_string(),
                ".".to_string(),
            ],
            config_files: vec![
                "package.json".to_string(),
                "nx.json".to_string(),
                "tsconfig.base.json".to_string(),
                "README.md".to_string(),
                "project-overview.md".to_string(),
            ],
            include_extensions: ["ts", "tsx", "js", "jsx", "json", "md"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            exclude_dirs: vec![
                "node_modules".to_string(),
                "dist".to_string(),
                "target".to_string(),
            ],
            exclude_globs: vec!["**/*.spec.*".to_string(), "**/*.test.*".to_string()],
            max_file_chars: 10_000,
            max_chunk_chars: DEFAULT_MAX_CHARS,
            min_chunk_chars: DEFAULT_MIN_CHARS,
            id_scheme: IdScheme::Random,
            max_retries: 0,
            retry_backoff_ms: 500,
            continue_on_error: false,
        }
    }
}

impl IndexingConfig {
    pub fn chunk_options(&self) -> ChunkOptions {
        ChunkOptions {
            max_chars: self.max_chunk_chars,
            min_chars: self.min_chunk_chars,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct LoggingConfig {
    /// Default filter directive when `SRCIDX_LOG` is unset.
    pub level: String,
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
        }
    }
}

/// Load and validate a config file. A missing file yields the defaults.
pub fn load_config(path: &Path) -> Result<Config> {
    if !path.exists() {
        return Ok(Config::default());
    }

    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    let config: Config = toml::from_str(&content)
        .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

    validate(&config)?;
    Ok(config)
}

/// Check cross-field constraints that serde cannot express.
pub fn validate(config: &Config) -> Result<()> {
    let indexing = &config.indexing;
    if indexing.max_chunk_chars == 0 {
        bail!("indexing.max_chunk_chars must be > 0");
    }
    if indexing.min_chunk_chars >= indexing.max_chunk_chars {
        bail!("indexing.min_chunk_chars must be < indexing.max_chunk_chars");
    }
    if indexing.max_file_chars == 0 {
        bail!("indexing.max_file_chars must be > 0");
    }

    if config.store.collection.trim().is_empty() {
        bail!("store.collection must not be empty");
    }
    if !(config.store.url.starts_with("http://") || config.store.url.starts_with("https://")) {
        bail!("store.url must be an http(s) URL, got '{}'", config.store.url);
    }

    if config.embedding.dims == Some(0) {
        bail!("embedding.dims must be > 0");
    }

    match config.embedding.provider.as_str() {
        "disabled" | "local" | "ollama" | "openai" => {}
        other => bail!(
            "Unknown embedding provider: '{}'. Must be disabled, local, ollama, or openai.",
            other
        ),
    }

    if matches!(config.embedding.provider.as_str(), "ollama" | "openai") {
        if config.embedding.model.is_none() {
            bail!(
                "embedding.model must be specified when provider is '{}'",
                config.embedding.provider
            );
        }
        if config.embedding.dims.is_none() {
            bail!(
                "embedding.dims must be specified when provider is '{}'",
                config.embedding.provider
            );
        }
    }

    Ok(())
}
