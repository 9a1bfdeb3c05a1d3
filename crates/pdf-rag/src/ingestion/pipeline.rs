//! Ingestion pipeline orchestration

use futures::future::join_all;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Semaphore;
use tokio::time::{sleep, timeout};

use crate::config::IngestConfig;
use crate::error::{Error, Result};
use crate::providers::{EmbeddingClient, VectorIndexWriter};
use crate::types::{Chunk, IndexEntry, IngestStage, IngestionResult, PageRecord};

use super::chunker::ChunkSplitter;
use super::parser::DocumentParser;

/// Orchestrates parse → split → embed → write for one document.
///
/// Collaborators are injected at construction; the pipeline holds no
/// global state, so concurrent runs for different documents are fully
/// independent. Each stage consumes the prior stage's complete output.
pub struct IngestionPipeline {
    config: IngestConfig,
    embedder: Arc<dyn EmbeddingClient>,
    writer: Arc<dyn VectorIndexWriter>,
}

impl IngestionPipeline {
    /// Create a pipeline with validated configuration
    pub fn new(
        config: IngestConfig,
        embedder: Arc<dyn EmbeddingClient>,
        writer: Arc<dyn VectorIndexWriter>,
    ) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            embedder,
            writer,
        })
    }

    /// Run the full pipeline for one uploaded blob. Always returns a
    /// structured result; failures are folded into the result rather than
    /// surfaced as errors.
    pub async fn run(&self, data: &[u8], filename: &str) -> IngestionResult {
        match self.execute(data, filename).await {
            Ok(chunk_count) => {
                tracing::info!("Ingested '{}': {} chunks", filename, chunk_count);
                IngestionResult::success(filename, chunk_count)
            }
            Err((stage, error)) => {
                tracing::error!("Ingestion of '{}' failed at '{}': {}", filename, stage, error);
                IngestionResult::failure(filename, stage, &error)
            }
        }
    }

    /// Walk the stages, tagging any error with the stage being reached
    async fn execute(
        &self,
        data: &[u8],
        filename: &str,
    ) -> std::result::Result<u32, (IngestStage, Error)> {
        // Received → Parsed
        let pages =
            DocumentParser::parse(data, filename).map_err(|e| (IngestStage::Parsed, e))?;
        tracing::debug!("Parsed '{}' into {} pages", filename, pages.len());

        // Parsed → Chunked
        let chunks = self.split(&pages).map_err(|e| (IngestStage::Chunked, e))?;
        if chunks.is_empty() {
            // Nothing extractable is a successful no-op, not an error
            tracing::info!("'{}' has no extractable text", filename);
            return Ok(0);
        }
        tracing::debug!("Split '{}' into {} chunks", filename, chunks.len());

        // Chunked → Embedded
        let vectors = self
            .embed_chunks(&chunks)
            .await
            .map_err(|e| (IngestStage::Embedded, e))?;

        // Embedded → Indexed
        let entries: Vec<IndexEntry> = chunks
            .iter()
            .zip(vectors)
            .map(|(chunk, vector)| IndexEntry::from_chunk(chunk, vector))
            .collect();
        let written = self
            .write_entries(&entries)
            .await
            .map_err(|e| (IngestStage::Indexed, e))?;

        // Indexed → Done
        Ok(written as u32)
    }

    fn split(&self, pages: &[PageRecord]) -> Result<Vec<Chunk>> {
        let splitter =
            ChunkSplitter::new(self.config.chunking.max_chunk_size, self.config.chunking.overlap)?;
        Ok(splitter.split(pages))
    }

    /// Embed all chunks in provider-sized batches under a bounded pool.
    /// Batches are independent, so dispatch order does not matter; the
    /// results are reassembled in chunk order.
    async fn embed_chunks(&self, chunks: &[Chunk]) -> Result<Vec<Vec<f32>>> {
        let batch_size = self.config.embedding.batch_size.max(1);
        let batches: Vec<Vec<String>> = chunks
            .chunks(batch_size)
            .map(|batch| batch.iter().map(|c| c.text.clone()).collect())
            .collect();

        let semaphore = Arc::new(Semaphore::new(self.config.embedding.parallel_batches.max(1)));
        let call_timeout = Duration::from_secs(self.config.embedding.timeout_secs);

        let batch_futures: Vec<_> = batches
            .iter()
            .map(|batch| {
                let semaphore = semaphore.clone();
                async move {
                    let _permit = semaphore.acquire().await.unwrap();
                    self.with_retry(IngestStage::Embedded, || async move {
                        let vectors = timeout(call_timeout, self.embedder.embed(batch))
                            .await
                            .map_err(|_| {
                                Error::embedding(format!(
                                    "embed call timed out after {}s",
                                    call_timeout.as_secs()
                                ))
                            })??;
                        self.check_vectors(batch.len(), &vectors)?;
                        Ok(vectors)
                    })
                    .await
                }
            })
            .collect();

        let mut all = Vec::with_capacity(chunks.len());
        for result in join_all(batch_futures).await {
            all.extend(result?);
        }
        Ok(all)
    }

    /// One vector per input, at the declared dimension, or the response is
    /// a provider error
    fn check_vectors(&self, expected: usize, vectors: &[Vec<f32>]) -> Result<()> {
        if vectors.len() != expected {
            return Err(Error::embedding(format!(
                "expected {} vectors, got {}",
                expected,
                vectors.len()
            )));
        }
        let dimensions = self.embedder.dimensions();
        if let Some(vector) = vectors.iter().find(|v| v.len() != dimensions) {
            return Err(Error::embedding(format!(
                "expected {}-dimensional vectors, got {}",
                dimensions,
                vector.len()
            )));
        }
        Ok(())
    }

    /// Upsert entries, narrowing each retry to the batches that have not
    /// landed yet. Deterministic ids make re-writing a batch safe.
    async fn write_entries(&self, entries: &[IndexEntry]) -> Result<usize> {
        let index_name = &self.config.index.index_name;
        let namespace = &self.config.index.namespace;
        let call_timeout = Duration::from_secs(self.config.index.timeout_secs);
        let max_retries = self.config.retry.max_retries;
        let base_delay = Duration::from_millis(self.config.retry.base_delay_ms);

        let mut pending: Vec<IndexEntry> = entries.to_vec();
        let mut last_message = String::new();

        for attempt in 0..=max_retries {
            let result = timeout(
                call_timeout,
                self.writer.upsert(index_name, namespace, &pending),
            )
            .await
            .unwrap_or_else(|_| {
                Err(Error::IndexWrite {
                    succeeded_batches: Vec::new(),
                    batch_size: self.config.index.batch_size,
                    message: format!("upsert timed out after {}s", call_timeout.as_secs()),
                })
            });

            match result {
                Ok(ack) => {
                    tracing::debug!(
                        "Index acknowledged {} entries into {}/{}",
                        ack.upserted,
                        index_name,
                        namespace
                    );
                    return Ok(entries.len());
                }
                Err(Error::IndexWrite {
                    succeeded_batches,
                    batch_size,
                    message,
                }) => {
                    pending = remaining_entries(&pending, &succeeded_batches, batch_size.max(1));
                    tracing::warn!(
                        "Index write attempt {}/{} failed ({}); {} entries left to retry",
                        attempt + 1,
                        max_retries + 1,
                        message,
                        pending.len()
                    );
                    last_message = message;
                    if attempt < max_retries {
                        sleep(base_delay * 2u32.pow(attempt)).await;
                    }
                }
                Err(e) => return Err(e),
            }
        }

        Err(Error::ingestion_failed(IngestStage::Indexed, last_message))
    }

    /// Retry a retryable operation with exponential backoff. Transient
    /// failures never surface individually; exhaustion comes back as
    /// `IngestionFailed` for the given stage.
    async fn with_retry<F, Fut, T>(&self, stage: IngestStage, operation: F) -> Result<T>
    where
        F: Fn() -> Fut,
        Fut: std::future::Future<Output = Result<T>>,
    {
        let max_retries = self.config.retry.max_retries;
        let base_delay = Duration::from_millis(self.config.retry.base_delay_ms);
        let mut last_error = None;

        for attempt in 0..=max_retries {
            match operation().await {
                Ok(value) => return Ok(value),
                Err(e) if e.is_retryable() => {
                    tracing::warn!(
                        "Attempt {}/{} failed ({}), backing off",
                        attempt + 1,
                        max_retries + 1,
                        e
                    );
                    last_error = Some(e);
                    if attempt < max_retries {
                        sleep(base_delay * 2u32.pow(attempt)).await;
                    }
                }
                Err(e) => return Err(e),
            }
        }

        let cause = last_error
            .map(|e| e.to_string())
            .unwrap_or_else(|| "retries exhausted".to_string());
        Err(Error::ingestion_failed(stage, cause))
    }
}

/// Drop the entries belonging to batches that already landed
fn remaining_entries(
    pending: &[IndexEntry],
    succeeded_batches: &[usize],
    batch_size: usize,
) -> Vec<IndexEntry> {
    pending
        .chunks(batch_size)
        .enumerate()
        .filter(|(batch_index, _)| !succeeded_batches.contains(batch_index))
        .flat_map(|(_, batch)| batch.iter().cloned())
        .collect()
}
