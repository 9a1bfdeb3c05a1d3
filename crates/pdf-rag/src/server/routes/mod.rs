//! API routes for the ingestion server

pub mod ingest;

use axum::{extract::DefaultBodyLimit, routing::post, Router};

use crate::server::state::AppState;

/// Build all API routes
pub fn api_routes(max_upload_size: usize) -> Router<AppState> {
    Router::new().route(
        "/ingest",
        post(ingest::ingest_document).layer(DefaultBodyLimit::max(max_upload_size)),
    )
}
