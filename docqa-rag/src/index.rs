//! Exact nearest-neighbor index over chunk embeddings.
//!
//! [`EmbeddingIndex`] is built once per document and never mutated afterwards.
//! It owns the chunk texts, their vectors, and the [`EmbeddingProvider`] used to
//! produce them, so queries are always embedded with the same model as the
//! chunks. Search is a brute-force Euclidean (L2) scan, which is exact and
//! deterministic at the tens-to-hundreds of chunks a single document yields.

use std::fmt;
use std::sync::Arc;

use futures::StreamExt;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info};

use crate::config::RagConfig;
use crate::document::ScoredChunk;
use crate::embedding::EmbeddingProvider;
use crate::error::{RagError, Result};

/// Batching knobs for [`EmbeddingIndex::build_with`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BuildOptions {
    /// Number of chunks per embedding request.
    pub batch_size: usize,
    /// Number of embedding requests allowed in flight at once.
    pub concurrency: usize,
}

impl Default for BuildOptions {
    fn default() -> Self {
        Self { batch_size: 32, concurrency: 1 }
    }
}

impl From<&RagConfig> for BuildOptions {
    fn from(config: &RagConfig) -> Self {
        Self { batch_size: config.batch_size, concurrency: config.embed_concurrency }
    }
}

/// An immutable set of chunk embeddings supporting top-k L2 search.
///
/// # Example
///
/// ```rust,ignore
/// use docqa_rag::{EmbeddingIndex, HashingEmbeddingProvider};
///
/// let provider = Arc::new(HashingEmbeddingProvider::default());
/// let index = EmbeddingIndex::build(provider, chunks, 32).await?;
/// let results = index.query("what is the refund policy?", 5).await?;
/// ```
pub struct EmbeddingIndex {
    provider: Arc<dyn EmbeddingProvider>,
    model_id: String,
    dimensions: usize,
    chunks: Vec<String>,
    vectors: Vec<Vec<f32>>,
}

impl fmt::Debug for EmbeddingIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EmbeddingIndex")
            .field("model_id", &self.model_id)
            .field("dimensions", &self.dimensions)
            .field("len", &self.chunks.len())
            .finish()
    }
}

impl EmbeddingIndex {
    /// An index holding no chunks. Every query against it returns no results.
    pub fn empty(provider: Arc<dyn EmbeddingProvider>) -> Self {
        Self {
            model_id: provider.model_id().to_string(),
            dimensions: provider.dimensions(),
            provider,
            chunks: Vec::new(),
            vectors: Vec::new(),
        }
    }

    /// Embed `chunks` in groups of `batch_size`, one request at a time.
    ///
    /// # Errors
    ///
    /// See [`build_with`](Self::build_with).
    pub async fn build(
        provider: Arc<dyn EmbeddingProvider>,
        chunks: Vec<String>,
        batch_size: usize,
    ) -> Result<Self> {
        let options = BuildOptions { batch_size, ..BuildOptions::default() };
        Self::build_with(provider, chunks, options, &CancellationToken::new()).await
    }

    /// Embed `chunks` and build the index.
    ///
    /// Up to `options.concurrency` batches are embedded at once; results are
    /// consumed in batch order so vector `i` always belongs to chunk `i`.
    /// The token is checked at every batch boundary.
    ///
    /// # Errors
    ///
    /// - [`RagError::ConfigError`] if `batch_size` or `concurrency` is zero.
    /// - [`RagError::Cancelled`] if `cancel` fires before the last batch.
    /// - [`RagError::EmbeddingError`] if a batch fails or returns the wrong
    ///   number of vectors.
    /// - [`RagError::DimensionMismatch`] if a vector's length differs from
    ///   the provider's reported dimensionality.
    ///
    /// No index is produced on error.
    pub async fn build_with(
        provider: Arc<dyn EmbeddingProvider>,
        chunks: Vec<String>,
        options: BuildOptions,
        cancel: &CancellationToken,
    ) -> Result<Self> {
        if options.batch_size == 0 || options.concurrency == 0 {
            return Err(RagError::ConfigError(
                "batch_size and concurrency must be greater than zero".to_string(),
            ));
        }
        if cancel.is_cancelled() {
            return Err(RagError::Cancelled);
        }

        let model_id = provider.model_id().to_string();
        let dimensions = provider.dimensions();
        let total_batches = chunks.len().div_ceil(options.batch_size);
        let mut vectors: Vec<Vec<f32>> = Vec::with_capacity(chunks.len());

        {
            let provider = &provider;
            let mut batches = futures::stream::iter(chunks.chunks(options.batch_size))
                .map(|group| async move {
                    let texts: Vec<&str> = group.iter().map(String::as_str).collect();
                    provider.embed_batch(&texts).await.map(|embeddings| (group.len(), embeddings))
                })
                .buffered(options.concurrency);

            let mut batch = 0;
            while let Some(result) = batches.next().await {
                batch += 1;
                if cancel.is_cancelled() {
                    info!(model = %model_id, batch, total_batches, "index build cancelled");
                    return Err(RagError::Cancelled);
                }

                let (expected, embeddings) = result.inspect_err(|e| {
                    error!(model = %model_id, batch, error = %e, "embedding batch failed");
                })?;
                if embeddings.len() != expected {
                    return Err(RagError::EmbeddingError {
                        provider: model_id.clone(),
                        message: format!(
                            "batch {batch} returned {} vectors for {expected} chunks",
                            embeddings.len()
                        ),
                    });
                }
                for embedding in embeddings {
                    if embedding.len() != dimensions {
                        return Err(RagError::DimensionMismatch {
                            expected: dimensions,
                            actual: embedding.len(),
                        });
                    }
                    vectors.push(embedding);
                }

                debug!(model = %model_id, batch, total_batches, "embedded batch");
            }
        }

        info!(model = %model_id, chunk_count = chunks.len(), dimensions, "built index");
        Ok(Self { provider, model_id, dimensions, chunks, vectors })
    }

    /// Return the `top_k` chunks closest to `text`, nearest first.
    ///
    /// At most `min(top_k, self.len())` results are returned. An empty index
    /// returns no results without calling the embedding provider.
    ///
    /// # Errors
    ///
    /// Propagates embedding failures for the query text.
    pub async fn query(&self, text: &str, top_k: usize) -> Result<Vec<ScoredChunk>> {
        if self.is_empty() || top_k == 0 {
            return Ok(Vec::new());
        }
        let embedding = self.provider.embed(text).await?;
        self.query_vector(&embedding, top_k)
    }

    /// Return the `top_k` chunks closest to a precomputed query vector.
    ///
    /// Ties are broken by chunk position.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::DimensionMismatch`] if `embedding` has the wrong length.
    pub fn query_vector(&self, embedding: &[f32], top_k: usize) -> Result<Vec<ScoredChunk>> {
        if self.is_empty() || top_k == 0 {
            return Ok(Vec::new());
        }
        if embedding.len() != self.dimensions {
            return Err(RagError::DimensionMismatch {
                expected: self.dimensions,
                actual: embedding.len(),
            });
        }

        let mut scored: Vec<(usize, f32)> = self
            .vectors
            .iter()
            .enumerate()
            .map(|(position, vector)| (position, l2_distance(vector, embedding)))
            .collect();
        scored.sort_by(|a, b| a.1.total_cmp(&b.1).then(a.0.cmp(&b.0)));
        scored.truncate(top_k);

        Ok(scored
            .into_iter()
            .map(|(position, distance)| ScoredChunk {
                position,
                text: self.chunks[position].clone(),
                distance,
            })
            .collect())
    }

    /// Number of indexed chunks.
    pub fn len(&self) -> usize {
        self.chunks.len()
    }

    /// Whether the index holds no chunks.
    pub fn is_empty(&self) -> bool {
        self.chunks.is_empty()
    }

    /// Dimensionality shared by every vector in the index.
    pub fn dimensions(&self) -> usize {
        self.dimensions
    }

    /// Model identifier of the provider the index was built with.
    pub fn model_id(&self) -> &str {
        &self.model_id
    }

    /// The indexed chunk texts, in build order.
    pub fn chunks(&self) -> &[String] {
        &self.chunks
    }
}

/// Euclidean distance between two vectors of equal length.
fn l2_distance(a: &[f32], b: &[f32]) -> f32 {
    a.iter().zip(b).map(|(x, y)| (x - y) * (x - y)).sum::<f32>().sqrt()
}
