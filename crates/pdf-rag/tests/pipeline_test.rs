//! End-to-end ingestion tests against the in-memory index backend

use async_trait::async_trait;
use std::sync::Arc;

use pdf_rag::config::IngestConfig;
use pdf_rag::error::Result;
use pdf_rag::ingestion::IngestionPipeline;
use pdf_rag::providers::{memory::MemoryIndexWriter, EmbeddingClient};
use pdf_rag::types::response::IngestStatus;

/// Deterministic embedder: the vector encodes the text length, so equal
/// inputs always embed equally
struct StubEmbedder {
    dimensions: usize,
}

#[async_trait]
impl EmbeddingClient for StubEmbedder {
    async fn embed(&self, batch: &[String]) -> Result<Vec<Vec<f32>>> {
        Ok(batch
            .iter()
            .map(|text| {
                let mut vector = vec![0.0f32; self.dimensions];
                vector[0] = text.chars().count() as f32;
                vector
            })
            .collect())
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }

    fn name(&self) -> &str {
        "stub"
    }
}

fn test_config() -> IngestConfig {
    let mut config = IngestConfig::default();
    config.chunking.max_chunk_size = 120;
    config.chunking.overlap = 30;
    config.embedding.batch_size = 8;
    config.retry.base_delay_ms = 1;
    config
}

fn pipeline(writer: Arc<MemoryIndexWriter>) -> IngestionPipeline {
    IngestionPipeline::new(
        test_config(),
        Arc::new(StubEmbedder { dimensions: 8 }),
        writer,
    )
    .unwrap()
}

const DOCUMENT: &[u8] = b"Shipping manifests arrive as scanned ledgers. \
Each ledger lists the port of origin, the vessel, and the declared cargo.\n\n\
Customs officers reconcile the declared cargo against the unloaded weight. \
Discrepancies above two percent trigger a manual inspection.\n\n\
Inspections are logged with the officer's badge number and a timestamp, \
and the ledger is archived for seven years.";

#[tokio::test]
async fn ingest_writes_entries_with_provenance_metadata() {
    let writer = Arc::new(MemoryIndexWriter::new());
    let result = pipeline(writer.clone())
        .run(DOCUMENT, "manifest.md")
        .await;

    assert_eq!(result.status, IngestStatus::Success);
    assert!(result.chunk_count > 1);

    let config = test_config();
    let ids = writer
        .ids(&config.index.index_name, &config.index.namespace)
        .await;
    assert_eq!(ids.len(), result.chunk_count as usize);

    for id in &ids {
        let entry = writer
            .get(&config.index.index_name, &config.index.namespace, id)
            .await
            .unwrap();
        assert_eq!(entry.vector.len(), 8);
        assert!(entry.text.chars().count() <= 120);
        assert_eq!(entry.metadata["source_filename"], "manifest.md");
        assert_eq!(entry.metadata["page_index"], 0);
        assert!(entry.metadata.contains_key("chunk_index"));
    }
}

#[tokio::test]
async fn reingesting_the_same_document_does_not_grow_the_index() {
    let writer = Arc::new(MemoryIndexWriter::new());
    let pipeline = pipeline(writer.clone());
    let config = test_config();

    let first = pipeline.run(DOCUMENT, "manifest.md").await;
    let count_after_first = writer
        .len(&config.index.index_name, &config.index.namespace)
        .await;

    let second = pipeline.run(DOCUMENT, "manifest.md").await;
    let count_after_second = writer
        .len(&config.index.index_name, &config.index.namespace)
        .await;

    assert_eq!(first.chunk_count, second.chunk_count);
    assert_eq!(count_after_first, count_after_second);
}

#[tokio::test]
async fn different_documents_keep_distinct_entries() {
    let writer = Arc::new(MemoryIndexWriter::new());
    let pipeline = pipeline(writer.clone());
    let config = test_config();

    let a = pipeline.run(DOCUMENT, "manifest-a.md").await;
    let b = pipeline.run(DOCUMENT, "manifest-b.md").await;

    assert_eq!(a.status, IngestStatus::Success);
    assert_eq!(b.status, IngestStatus::Success);
    assert_eq!(
        writer
            .len(&config.index.index_name, &config.index.namespace)
            .await,
        (a.chunk_count + b.chunk_count) as usize
    );
}

#[tokio::test]
async fn empty_upload_is_a_successful_noop() {
    let writer = Arc::new(MemoryIndexWriter::new());
    let result = pipeline(writer.clone()).run(b"", "blank.txt").await;

    assert_eq!(result.status, IngestStatus::Success);
    assert_eq!(result.chunk_count, 0);

    let config = test_config();
    assert_eq!(
        writer
            .len(&config.index.index_name, &config.index.namespace)
            .await,
        0
    );
}

#[tokio::test]
async fn boundary_serialization_matches_the_response_contract() {
    let writer = Arc::new(MemoryIndexWriter::new());
    let result = pipeline(writer).run(DOCUMENT, "manifest.md").await;

    let value = serde_json::to_value(&result).unwrap();
    assert_eq!(value["status"], "success");
    assert_eq!(value["filename"], "manifest.md");
    assert_eq!(value["chunks"], result.chunk_count);
    assert!(value.get("error").is_none());
}
