//! Page, chunk, and index entry types

use serde::{Deserialize, Serialize};
use serde_json::json;
use sha2::{Digest, Sha256};
use std::collections::HashMap;

/// Formats the parser declares support for
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum DocumentFormat {
    /// PDF document
    Pdf,
    /// Plain text file
    Txt,
    /// Markdown file
    Markdown,
    /// Unknown file type
    Unknown,
}

impl DocumentFormat {
    /// Detect format from the filename extension
    pub fn from_filename(filename: &str) -> Self {
        let extension = filename.rsplit('.').next().unwrap_or("").to_lowercase();
        match extension.as_str() {
            "pdf" => Self::Pdf,
            "txt" | "text" => Self::Txt,
            "md" | "markdown" => Self::Markdown,
            _ => Self::Unknown,
        }
    }

    /// Check if this is a supported format
    pub fn is_supported(&self) -> bool {
        !matches!(self, Self::Unknown)
    }
}

/// One logical page of extracted text. Page order follows the source
/// document; `page_index` is 0-based and contiguous.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageRecord {
    /// Extracted text content
    pub text: String,
    /// 0-based page position
    pub page_index: u32,
    /// Filename the page came from
    pub source_filename: String,
}

/// Bounded text segment prepared for embedding
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Chunk {
    /// Text content, at most `max_chunk_size` characters
    pub text: String,
    /// Position in the whole document, monotone from 0
    pub chunk_index: u32,
    /// Filename the chunk came from
    pub source_filename: String,
    /// Page contributing the majority of the chunk's text
    pub page_index: u32,
}

impl Chunk {
    /// Deterministic entry id: the same filename and chunk index always map
    /// to the same id, so re-ingestion replaces instead of duplicating.
    pub fn entry_id(&self) -> String {
        let mut hasher = Sha256::new();
        hasher.update(self.source_filename.as_bytes());
        hasher.update(b":");
        hasher.update(self.chunk_index.to_string().as_bytes());
        hex::encode(hasher.finalize())
    }
}

/// A (vector, text, metadata) triple ready for upsert
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndexEntry {
    /// Deterministic id derived from the source chunk
    pub id: String,
    /// Embedding vector
    pub vector: Vec<f32>,
    /// Chunk text
    pub text: String,
    /// Provenance metadata
    pub metadata: HashMap<String, serde_json::Value>,
}

impl IndexEntry {
    /// Build an entry from a chunk and its embedding
    pub fn from_chunk(chunk: &Chunk, vector: Vec<f32>) -> Self {
        let mut metadata = HashMap::new();
        metadata.insert(
            "source_filename".to_string(),
            json!(chunk.source_filename),
        );
        metadata.insert("page_index".to_string(), json!(chunk.page_index));
        metadata.insert("chunk_index".to_string(), json!(chunk.chunk_index));

        Self {
            id: chunk.entry_id(),
            vector,
            text: chunk.text.clone(),
            metadata,
        }
    }
}
