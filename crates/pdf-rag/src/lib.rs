//! pdf-rag: document ingestion backend for a PDF RAG system
//!
//! Parses uploaded documents into page records, splits them into
//! overlapping chunks, embeds each chunk through a pluggable embedding
//! client, and upserts the vectors into a namespaced index. Entry ids are
//! deterministic, so re-ingesting a file replaces its entries instead of
//! duplicating them.

pub mod config;
pub mod error;
pub mod ingestion;
pub mod providers;
pub mod server;
pub mod types;

pub use config::IngestConfig;
pub use error::{Error, Result};
pub use ingestion::{ChunkSplitter, DocumentParser, IngestionPipeline};
pub use types::{
    document::{Chunk, IndexEntry, PageRecord},
    response::{IngestStage, IngestionResult},
};
