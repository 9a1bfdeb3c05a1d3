//! Ingestion server binary
//!
//! Run with: cargo run -p pdf-rag --bin pdf-rag-server

use std::sync::Arc;

use pdf_rag::config::{IndexBackend, IngestConfig};
use pdf_rag::ingestion::IngestionPipeline;
use pdf_rag::providers::{
    memory::MemoryIndexWriter, openai::OpenAiEmbedder, pinecone::PineconeIndexWriter,
    VectorIndexWriter,
};
use pdf_rag::server::{state::AppState, IngestServer};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "pdf_rag=info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = match std::env::var("PDF_RAG_CONFIG") {
        Ok(path) => IngestConfig::load(path.as_ref())?,
        Err(_) => IngestConfig::default(),
    };
    config.validate()?;

    tracing::info!("Configuration loaded");
    tracing::info!("  - Embedding model: {}", config.embedding.model);
    tracing::info!(
        "  - Index: {}/{} ({:?} backend)",
        config.index.index_name,
        config.index.namespace,
        config.index.backend
    );
    tracing::info!(
        "  - Chunking: {} chars, {} overlap",
        config.chunking.max_chunk_size,
        config.chunking.overlap
    );

    let embedder = Arc::new(OpenAiEmbedder::new(&config.embedding)?);

    let writer: Arc<dyn VectorIndexWriter> = match config.index.backend {
        IndexBackend::Pinecone => Arc::new(PineconeIndexWriter::new(&config.index)?),
        IndexBackend::Memory => {
            tracing::warn!("Using in-memory index backend; entries are lost on shutdown");
            Arc::new(MemoryIndexWriter::new())
        }
    };

    let pipeline = IngestionPipeline::new(config.clone(), embedder, writer)?;
    let state = AppState::new(config.clone(), pipeline);
    let server = IngestServer::new(config, state);

    tracing::info!("POST /api/ingest to upload documents");
    server.start().await?;

    Ok(())
}
