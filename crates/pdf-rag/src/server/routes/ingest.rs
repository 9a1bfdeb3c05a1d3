//! Document ingestion endpoint

use axum::extract::{Multipart, State};
use uuid::Uuid;

use crate::error::{Error, Result};
use crate::server::state::AppState;
use crate::types::IngestionResult;

/// POST /api/ingest - upload a document and run the ingestion pipeline.
///
/// Takes the first file field of the multipart body. The response is the
/// serialized `IngestionResult` either way; pipeline failures come back as
/// a structured failure body, never a bare error.
pub async fn ingest_document(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<IngestionResult> {
    if let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| Error::Upload(format!("failed to read multipart field: {}", e)))?
    {
        let filename = field
            .file_name()
            .map(|s| s.to_string())
            .unwrap_or_else(|| format!("upload-{}.bin", Uuid::new_v4()));

        let data = field
            .bytes()
            .await
            .map_err(|e| Error::Upload(format!("failed to read '{}': {}", filename, e)))?;

        tracing::info!("Received '{}' ({} bytes)", filename, data.len());

        return Ok(state.pipeline().run(&data, &filename).await);
    }

    Err(Error::Upload(
        "multipart body contained no file field".to_string(),
    ))
}
