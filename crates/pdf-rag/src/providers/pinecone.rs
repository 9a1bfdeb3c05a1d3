//! Pinecone-compatible vector index writer

use async_trait::async_trait;
use futures::future::join_all;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Semaphore;

use crate::config::IndexConfig;
use crate::error::{Error, Result};
use crate::types::{IndexEntry, WriteAck};

use super::vector_store::VectorIndexWriter;

/// REST writer for a Pinecone-compatible `/vectors/upsert` endpoint.
///
/// `api_base` is the index host, which already addresses one index;
/// `index_name` only shows up in logs. Entries are split into
/// provider-bounded batches and dispatched under a bounded pool; a failed
/// batch fails the whole call with the surviving batch indices attached.
pub struct PineconeIndexWriter {
    client: Client,
    api_base: String,
    api_key: String,
    batch_size: usize,
    parallel_batches: usize,
}

#[derive(Serialize)]
struct UpsertRequest<'a> {
    vectors: Vec<UpsertVector<'a>>,
    namespace: &'a str,
}

#[derive(Serialize)]
struct UpsertVector<'a> {
    id: &'a str,
    values: &'a [f32],
    metadata: serde_json::Value,
}

#[derive(Deserialize)]
struct UpsertResponse {
    #[serde(rename = "upsertedCount", default)]
    upserted_count: usize,
}

impl PineconeIndexWriter {
    /// Create a writer from config; the API key is read from the
    /// environment variable the config names
    pub fn new(config: &IndexConfig) -> Result<Self> {
        if config.api_base.is_empty() {
            return Err(Error::InvalidConfiguration(
                "index.api_base must be set for the pinecone backend".to_string(),
            ));
        }
        let api_key = std::env::var(&config.api_key_env).map_err(|_| {
            Error::InvalidConfiguration(format!("{} is not set", config.api_key_env))
        })?;

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            client,
            api_base: config.api_base.trim_end_matches('/').to_string(),
            api_key,
            batch_size: config.batch_size.max(1),
            parallel_batches: config.parallel_batches.max(1),
        })
    }

    async fn upsert_batch(
        &self,
        url: &str,
        namespace: &str,
        batch: &[IndexEntry],
    ) -> std::result::Result<usize, String> {
        let vectors = batch
            .iter()
            .map(|entry| {
                let mut metadata = serde_json::Map::new();
                for (key, value) in &entry.metadata {
                    metadata.insert(key.clone(), value.clone());
                }
                // Pinecone convention: the chunk text rides along in
                // metadata so retrieval can return it without a second
                // store.
                metadata.insert(
                    "text".to_string(),
                    serde_json::Value::String(entry.text.clone()),
                );
                UpsertVector {
                    id: &entry.id,
                    values: &entry.vector,
                    metadata: serde_json::Value::Object(metadata),
                }
            })
            .collect();

        let response = self
            .client
            .post(url)
            .header("Api-Key", &self.api_key)
            .json(&UpsertRequest { vectors, namespace })
            .send()
            .await
            .map_err(|e| format!("request failed: {}", e))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(format!("HTTP {}: {}", status, body));
        }

        let parsed: UpsertResponse = response
            .json()
            .await
            .map_err(|e| format!("unreadable response: {}", e))?;

        Ok(parsed.upserted_count)
    }
}

#[async_trait]
impl VectorIndexWriter for PineconeIndexWriter {
    async fn upsert(
        &self,
        index_name: &str,
        namespace: &str,
        entries: &[IndexEntry],
    ) -> Result<WriteAck> {
        if entries.is_empty() {
            return Ok(WriteAck { upserted: 0 });
        }

        let url = format!("{}/vectors/upsert", self.api_base);
        let semaphore = Arc::new(Semaphore::new(self.parallel_batches));

        let batch_futures: Vec<_> = entries
            .chunks(self.batch_size)
            .enumerate()
            .map(|(batch_index, batch)| {
                let semaphore = semaphore.clone();
                let url = url.clone();
                async move {
                    let _permit = semaphore.acquire().await.unwrap();
                    let result = self.upsert_batch(&url, namespace, batch).await;
                    (batch_index, result)
                }
            })
            .collect();

        let mut succeeded_batches = Vec::new();
        let mut upserted = 0usize;
        let mut first_failure: Option<(usize, String)> = None;

        for (batch_index, result) in join_all(batch_futures).await {
            match result {
                Ok(count) => {
                    succeeded_batches.push(batch_index);
                    upserted += count;
                }
                Err(message) => {
                    if first_failure.is_none() {
                        first_failure = Some((batch_index, message));
                    }
                }
            }
        }

        if let Some((batch_index, message)) = first_failure {
            succeeded_batches.sort_unstable();
            return Err(Error::IndexWrite {
                succeeded_batches,
                batch_size: self.batch_size,
                message: format!("batch {} failed: {}", batch_index, message),
            });
        }

        tracing::debug!(
            "Upserted {} entries into {}/{}",
            upserted,
            index_name,
            namespace
        );
        Ok(WriteAck { upserted })
    }

    fn name(&self) -> &str {
        "pinecone"
    }
}
