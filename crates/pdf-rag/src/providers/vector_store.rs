//! Vector index writer trait

use async_trait::async_trait;

use crate::error::Result;
use crate::types::{IndexEntry, WriteAck};

/// Provider payload bound for a single upsert request. Writers split entry
/// sequences into groups of at most this size unless configured otherwise.
pub const DEFAULT_UPSERT_BATCH_SIZE: usize = 100;

/// Writes (vector, text, metadata) entries into a namespaced index.
///
/// Upsert is keyed by `IndexEntry::id`: writing an id that already exists
/// replaces the prior entry. Re-ingesting identical content therefore
/// rewrites the same entries instead of duplicating them, and concurrent
/// ingestion of the same filename resolves as last-write-wins. A shrinking
/// re-ingest can leave tail entries from the longer prior run; callers
/// that care should clear the namespace first.
///
/// Implementations:
/// - `PineconeIndexWriter`: Pinecone-compatible REST upsert
/// - `MemoryIndexWriter`: in-memory store for tests and local development
#[async_trait]
pub trait VectorIndexWriter: Send + Sync {
    /// Upsert entries into `index_name`/`namespace`. A partial failure
    /// returns `Error::IndexWrite` naming the batches that landed, so the
    /// caller can retry only the rest.
    async fn upsert(
        &self,
        index_name: &str,
        namespace: &str,
        entries: &[IndexEntry],
    ) -> Result<WriteAck>;

    /// Provider name for logging
    fn name(&self) -> &str;
}
