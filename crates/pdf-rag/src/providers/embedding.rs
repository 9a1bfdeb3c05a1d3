//! Embedding client trait

use async_trait::async_trait;

use crate::error::Result;

/// Turns batches of chunk text into fixed-dimension vectors.
///
/// Implementations:
/// - `OpenAiEmbedder`: OpenAI-compatible embeddings API
#[async_trait]
pub trait EmbeddingClient: Send + Sync {
    /// Embed a batch of texts: one vector per input, in input order
    async fn embed(&self, batch: &[String]) -> Result<Vec<Vec<f32>>>;

    /// Declared vector dimension for the model
    fn dimensions(&self) -> usize;

    /// Provider name for logging
    fn name(&self) -> &str;
}
