//! In-memory index writer for tests and local development

use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::RwLock;

use crate::error::Result;
use crate::types::{IndexEntry, WriteAck};

use super::vector_store::VectorIndexWriter;

/// Id-keyed in-memory store. Upserting an existing id replaces the entry,
/// which is what makes re-ingestion count-stable.
pub struct MemoryIndexWriter {
    namespaces: RwLock<HashMap<String, HashMap<String, IndexEntry>>>,
}

impl MemoryIndexWriter {
    /// Create an empty store
    pub fn new() -> Self {
        Self {
            namespaces: RwLock::new(HashMap::new()),
        }
    }

    fn key(index_name: &str, namespace: &str) -> String {
        format!("{}/{}", index_name, namespace)
    }

    /// Number of entries in a namespace
    pub async fn len(&self, index_name: &str, namespace: &str) -> usize {
        self.namespaces
            .read()
            .await
            .get(&Self::key(index_name, namespace))
            .map_or(0, HashMap::len)
    }

    /// Sorted ids currently stored in a namespace
    pub async fn ids(&self, index_name: &str, namespace: &str) -> Vec<String> {
        let mut ids: Vec<String> = self
            .namespaces
            .read()
            .await
            .get(&Self::key(index_name, namespace))
            .map(|bucket| bucket.keys().cloned().collect())
            .unwrap_or_default();
        ids.sort_unstable();
        ids
    }

    /// Fetch one entry by id
    pub async fn get(&self, index_name: &str, namespace: &str, id: &str) -> Option<IndexEntry> {
        self.namespaces
            .read()
            .await
            .get(&Self::key(index_name, namespace))
            .and_then(|bucket| bucket.get(id).cloned())
    }
}

impl Default for MemoryIndexWriter {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl VectorIndexWriter for MemoryIndexWriter {
    async fn upsert(
        &self,
        index_name: &str,
        namespace: &str,
        entries: &[IndexEntry],
    ) -> Result<WriteAck> {
        let mut namespaces = self.namespaces.write().await;
        let bucket = namespaces
            .entry(Self::key(index_name, namespace))
            .or_default();
        for entry in entries {
            bucket.insert(entry.id.clone(), entry.clone());
        }
        Ok(WriteAck {
            upserted: entries.len(),
        })
    }

    fn name(&self) -> &str {
        "memory"
    }
}
