//! Result types returned to the upload boundary

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::error::Error;

/// Pipeline states. A failure records the state the pipeline was trying
/// to reach when the stage gave out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IngestStage {
    Received,
    Parsed,
    Chunked,
    Embedded,
    Indexed,
    Done,
    Failed,
}

impl std::fmt::Display for IngestStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Received => "received",
            Self::Parsed => "parsed",
            Self::Chunked => "chunked",
            Self::Embedded => "embedded",
            Self::Indexed => "indexed",
            Self::Done => "done",
            Self::Failed => "failed",
        };
        f.write_str(name)
    }
}

/// Overall outcome of an ingestion run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IngestStatus {
    Success,
    Failure,
}

/// Failure details: stable error kind, human-readable message, and the
/// stage the pipeline failed in
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorDetail {
    pub kind: String,
    pub message: String,
    pub stage: IngestStage,
}

/// Result of one ingestion run, serialized verbatim to the boundary
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IngestionResult {
    pub status: IngestStatus,
    #[serde(rename = "chunks")]
    pub chunk_count: u32,
    pub filename: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<ErrorDetail>,
}

impl IngestionResult {
    /// Successful completion with the number of entries written
    pub fn success(filename: impl Into<String>, chunk_count: u32) -> Self {
        Self {
            status: IngestStatus::Success,
            chunk_count,
            filename: filename.into(),
            error: None,
        }
    }

    /// Failure at the given stage
    pub fn failure(filename: impl Into<String>, stage: IngestStage, error: &Error) -> Self {
        Self {
            status: IngestStatus::Failure,
            chunk_count: 0,
            filename: filename.into(),
            error: Some(ErrorDetail {
                kind: error.kind().to_string(),
                message: error.to_string(),
                stage,
            }),
        }
    }
}

impl IntoResponse for IngestionResult {
    fn into_response(self) -> Response {
        let status = match self.status {
            IngestStatus::Success => StatusCode::OK,
            IngestStatus::Failure => match self.error.as_ref().map(|e| e.kind.as_str()) {
                Some("unsupported_format") => StatusCode::UNSUPPORTED_MEDIA_TYPE,
                Some("invalid_configuration") | Some("parse_error") | Some("upload_error") => {
                    StatusCode::BAD_REQUEST
                }
                _ => StatusCode::BAD_GATEWAY,
            },
        };
        (status, Json(self)).into_response()
    }
}

/// Acknowledgement from a vector index upsert
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WriteAck {
    /// Number of entries the index accepted
    pub upserted: usize,
}
