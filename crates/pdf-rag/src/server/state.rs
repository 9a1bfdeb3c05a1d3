//! Application state shared across request handlers

use std::sync::Arc;

use crate::config::IngestConfig;
use crate::ingestion::IngestionPipeline;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: IngestConfig,
    pipeline: IngestionPipeline,
}

impl AppState {
    /// Wrap a constructed pipeline for sharing across handlers
    pub fn new(config: IngestConfig, pipeline: IngestionPipeline) -> Self {
        Self {
            inner: Arc::new(AppStateInner { config, pipeline }),
        }
    }

    pub fn config(&self) -> &IngestConfig {
        &self.inner.config
    }

    pub fn pipeline(&self) -> &IngestionPipeline {
        &self.inner.pipeline
    }
}
