//! Configuration for the ingestion service

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::{Error, Result};
use crate::providers::vector_store::DEFAULT_UPSERT_BATCH_SIZE;

/// Main ingestion service configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct IngestConfig {
    /// Server configuration
    #[serde(default)]
    pub server: ServerConfig,
    /// Chunking configuration
    #[serde(default)]
    pub chunking: ChunkingConfig,
    /// Embedding provider configuration
    #[serde(default)]
    pub embedding: EmbeddingConfig,
    /// Vector index configuration
    #[serde(default)]
    pub index: IndexConfig,
    /// Retry configuration for provider calls
    #[serde(default)]
    pub retry: RetryConfig,
}

impl IngestConfig {
    /// Load configuration from a TOML file and validate it
    pub fn load(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)?;
        let config: Self = toml::from_str(&raw).map_err(|e| {
            Error::InvalidConfiguration(format!("{}: {}", path.display(), e))
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Check the constraints the pipeline depends on
    pub fn validate(&self) -> Result<()> {
        if self.chunking.max_chunk_size == 0 {
            return Err(Error::InvalidConfiguration(
                "chunking.max_chunk_size must be positive".to_string(),
            ));
        }
        if self.chunking.overlap >= self.chunking.max_chunk_size {
            return Err(Error::InvalidConfiguration(format!(
                "chunking.overlap ({}) must be smaller than chunking.max_chunk_size ({})",
                self.chunking.overlap, self.chunking.max_chunk_size
            )));
        }
        if self.embedding.batch_size == 0 {
            return Err(Error::InvalidConfiguration(
                "embedding.batch_size must be positive".to_string(),
            ));
        }
        if self.index.batch_size == 0 {
            return Err(Error::InvalidConfiguration(
                "index.batch_size must be positive".to_string(),
            ));
        }
        Ok(())
    }
}

/// Server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Host address
    pub host: String,
    /// Port number
    pub port: u16,
    /// Origin allowed by CORS (the upload frontend)
    pub allowed_origin: String,
    /// Maximum upload size in bytes (default: 50MB)
    pub max_upload_size: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8000,
            allowed_origin: "http://localhost:3000".to_string(),
            max_upload_size: 50 * 1024 * 1024,
        }
    }
}

/// Text chunking configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChunkingConfig {
    /// Maximum chunk size in characters
    #[serde(default = "default_max_chunk_size")]
    pub max_chunk_size: usize,
    /// Overlap between consecutive chunks in characters
    #[serde(default = "default_overlap")]
    pub overlap: usize,
}

fn default_max_chunk_size() -> usize {
    1000
}

fn default_overlap() -> usize {
    200
}

impl Default for ChunkingConfig {
    fn default() -> Self {
        Self {
            max_chunk_size: default_max_chunk_size(),
            overlap: default_overlap(),
        }
    }
}

/// Embedding provider configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmbeddingConfig {
    /// Model identifier sent to the provider
    pub model: String,
    /// Declared vector dimension for the model
    pub dimensions: usize,
    /// Number of chunk texts per embed request
    pub batch_size: usize,
    /// Bound on concurrently in-flight embed requests
    pub parallel_batches: usize,
    /// Base URL of an OpenAI-compatible embeddings API
    pub api_base: String,
    /// Environment variable holding the API key (never stored in the file)
    pub api_key_env: String,
    /// Per-call timeout in seconds
    pub timeout_secs: u64,
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            model: "text-embedding-3-small".to_string(),
            dimensions: 1536,
            batch_size: 64,
            parallel_batches: 4,
            api_base: "https://api.openai.com/v1".to_string(),
            api_key_env: "OPENAI_API_KEY".to_string(),
            timeout_secs: 30,
        }
    }
}

/// Vector index configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndexConfig {
    /// Index backend selection
    #[serde(default)]
    pub backend: IndexBackend,
    /// Target index name
    pub index_name: String,
    /// Namespace within the index
    pub namespace: String,
    /// Entries per upsert request (provider payload bound)
    pub batch_size: usize,
    /// Bound on concurrently in-flight upsert requests
    pub parallel_batches: usize,
    /// Index host base URL (pinecone backend)
    pub api_base: String,
    /// Environment variable holding the API key
    pub api_key_env: String,
    /// Per-call timeout in seconds
    pub timeout_secs: u64,
}

impl Default for IndexConfig {
    fn default() -> Self {
        Self {
            backend: IndexBackend::default(),
            index_name: "pdf-rag-project".to_string(),
            namespace: "pdf-rag".to_string(),
            batch_size: DEFAULT_UPSERT_BATCH_SIZE,
            parallel_batches: 4,
            api_base: String::new(),
            api_key_env: "PINECONE_API_KEY".to_string(),
            timeout_secs: 30,
        }
    }
}

/// Index backend selection
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum IndexBackend {
    /// In-memory writer (development and tests)
    #[default]
    Memory,
    /// Pinecone-compatible REST index
    Pinecone,
}

/// Retry configuration for transient provider failures
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetryConfig {
    /// Additional attempts after the first failure
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
    /// Backoff base delay; attempt n waits `base_delay_ms * 2^n`
    #[serde(default = "default_base_delay_ms")]
    pub base_delay_ms: u64,
}

fn default_max_retries() -> u32 {
    3
}

fn default_base_delay_ms() -> u64 {
    500
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: default_max_retries(),
            base_delay_ms: default_base_delay_ms(),
        }
    }
}
