//! Core data types for ingestion

pub mod document;
pub mod response;

pub use document::{Chunk, DocumentFormat, IndexEntry, PageRecord};
pub use response::{ErrorDetail, IngestStage, IngestStatus, IngestionResult, WriteAck};
