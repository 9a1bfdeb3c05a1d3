//! Error types for the ingestion service

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::types::response::IngestStage;

/// Result type alias for ingestion operations
pub type Result<T> = std::result::Result<T, Error>;

/// Ingestion service errors
#[derive(Debug, Error)]
pub enum Error {
    /// File format the parser does not declare support for
    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),

    /// Caller-supplied configuration is unusable
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// File could not be parsed
    #[error("Failed to parse '{filename}': {message}")]
    Parse { filename: String, message: String },

    /// Embedding provider transport/quota failure (retryable)
    #[error("Embedding provider error: {0}")]
    EmbeddingProvider(String),

    /// Index upsert failure. `succeeded_batches` names the batches that
    /// landed so the caller can retry only the rest.
    #[error("Index write failed: {message}")]
    IndexWrite {
        succeeded_batches: Vec<usize>,
        batch_size: usize,
        message: String,
    },

    /// Terminal wrapper surfaced after retries are exhausted
    #[error("Ingestion failed at stage '{stage}': {message}")]
    IngestionFailed { stage: IngestStage, message: String },

    /// Malformed or incomplete upload
    #[error("Upload error: {0}")]
    Upload(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// HTTP request error
    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),
}

impl Error {
    /// Create a parse error
    pub fn parse(filename: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Parse {
            filename: filename.into(),
            message: message.into(),
        }
    }

    /// Create an embedding provider error
    pub fn embedding(message: impl Into<String>) -> Self {
        Self::EmbeddingProvider(message.into())
    }

    /// Create an ingestion failure for the given stage
    pub fn ingestion_failed(stage: IngestStage, message: impl Into<String>) -> Self {
        Self::IngestionFailed {
            stage,
            message: message.into(),
        }
    }

    /// Stable kind identifier used in the boundary's error payload
    pub fn kind(&self) -> &'static str {
        match self {
            Self::UnsupportedFormat(_) => "unsupported_format",
            Self::InvalidConfiguration(_) => "invalid_configuration",
            Self::Parse { .. } => "parse_error",
            Self::EmbeddingProvider(_) => "embedding_provider_error",
            Self::IndexWrite { .. } => "index_write_error",
            Self::IngestionFailed { .. } => "ingestion_failed",
            Self::Upload(_) => "upload_error",
            Self::Io(_) => "io_error",
            Self::Http(_) => "http_error",
        }
    }

    /// Transient provider failures the pipeline retries with backoff.
    /// Everything else surfaces verbatim.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::EmbeddingProvider(_) | Self::IndexWrite { .. } | Self::Http(_)
        )
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let status = match &self {
            Error::UnsupportedFormat(_) => StatusCode::UNSUPPORTED_MEDIA_TYPE,
            Error::InvalidConfiguration(_) | Error::Parse { .. } | Error::Upload(_) => {
                StatusCode::BAD_REQUEST
            }
            Error::EmbeddingProvider(_)
            | Error::IndexWrite { .. }
            | Error::IngestionFailed { .. }
            | Error::Http(_) => StatusCode::BAD_GATEWAY,
            Error::Io(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let body = Json(json!({
            "status": "failure",
            "error": {
                "kind": self.kind(),
                "message": self.to_string(),
            }
        }));

        (status, body).into_response()
    }
}
