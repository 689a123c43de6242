//! The embedding seam between chunk text and the index.

use async_trait::async_trait;

use crate::error::Result;

/// Canonical embedding model: all-MiniLM-L6-v2 as served by Ollama.
pub const DEFAULT_EMBEDDING_MODEL: &str = "all-minilm";

/// Output dimensionality of [`DEFAULT_EMBEDDING_MODEL`].
pub const DEFAULT_EMBEDDING_DIMENSIONS: usize = 384;

/// Maps text to fixed-length vectors under one model.
///
/// The same text must always yield the same vector. An
/// [`EmbeddingIndex`](crate::EmbeddingIndex) keeps the provider it was built
/// with and embeds queries through it, so chunks and queries share one model.
///
/// # Example
///
/// ```rust,ignore
/// use docqa_rag::{EmbeddingProvider, HashingEmbeddingProvider};
///
/// let provider = HashingEmbeddingProvider::default();
/// let vectors = provider.embed_batch(&["first chunk", "second chunk"]).await?;
/// assert!(vectors.iter().all(|v| v.len() == provider.dimensions()));
/// ```
#[async_trait]
pub trait EmbeddingProvider: Send + Sync {
    /// Embed one text.
    async fn embed(&self, text: &str) -> Result<Vec<f32>>;

    /// Embed several texts, returning vectors in input order.
    ///
    /// Falls back to one [`embed`](EmbeddingProvider::embed) call per text;
    /// backends with a batch endpoint override this.
    async fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>> {
        let mut vectors = Vec::with_capacity(texts.len());
        for text in texts {
            vectors.push(self.embed(text).await?);
        }
        Ok(vectors)
    }

    /// Length of every vector this provider returns.
    fn dimensions(&self) -> usize;

    /// Identifier of the underlying model, recorded on every index built with it.
    fn model_id(&self) -> &str;
}
