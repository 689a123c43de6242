//! Configuration for chunking and retrieval.

use serde::{Deserialize, Serialize};

use crate::chunking::{Chunker, FixedSizeChunker, StructuredChunker};
use crate::error::{RagError, Result};

/// Which chunker a [`Retriever`](crate::Retriever) splits documents with.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ChunkingStrategy {
    /// Page, paragraph and sentence aware splitting. See [`StructuredChunker`](crate::StructuredChunker).
    #[default]
    Structured,
    /// Plain sliding window. See [`FixedSizeChunker`](crate::FixedSizeChunker).
    Fixed,
}

/// Configuration parameters for chunking, indexing and retrieval.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct RagConfig {
    /// Maximum chunk size in characters.
    pub chunk_size: usize,
    /// Number of overlapping characters between consecutive chunks.
    pub chunk_overlap: usize,
    /// Chunks whose trimmed length is below this are dropped by the structured chunker.
    pub min_chunk_chars: usize,
    /// Chunker used when processing a document.
    pub strategy: ChunkingStrategy,
    /// Number of nearest chunks fetched for a question.
    pub top_k: usize,
    /// Number of chunks sent to the embedding provider per request.
    pub batch_size: usize,
    /// Number of embedding batches allowed in flight at once.
    pub embed_concurrency: usize,
    /// Upper bound on the characters of retrieved context handed to the generator.
    pub max_context_chars: usize,
}

impl Default for RagConfig {
    fn default() -> Self {
        Self {
            chunk_size: 1200,
            chunk_overlap: 200,
            min_chunk_chars: 50,
            strategy: ChunkingStrategy::Structured,
            top_k: 5,
            batch_size: 32,
            embed_concurrency: 1,
            max_context_chars: 2000,
        }
    }
}

impl RagConfig {
    /// Create a new builder for constructing a [`RagConfig`].
    pub fn builder() -> RagConfigBuilder {
        RagConfigBuilder::default()
    }

    /// Check the invariants every chunker and index build relies on.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::ConfigError`] describing the first violated constraint.
    pub fn validate(&self) -> Result<()> {
        validate_chunking(self.chunk_size, self.chunk_overlap)?;
        if self.top_k == 0 {
            return Err(RagError::ConfigError("top_k must be greater than zero".to_string()));
        }
        if self.batch_size == 0 {
            return Err(RagError::ConfigError("batch_size must be greater than zero".to_string()));
        }
        if self.embed_concurrency == 0 {
            return Err(RagError::ConfigError(
                "embed_concurrency must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }

    /// The chunker selected by [`strategy`](Self::strategy), sized from this config.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::ConfigError`] if `chunk_size` or `chunk_overlap` is invalid.
    pub fn chunker(&self) -> Result<Box<dyn Chunker>> {
        Ok(match self.strategy {
            ChunkingStrategy::Structured => Box::new(
                StructuredChunker::new(self.chunk_size, self.chunk_overlap)?
                    .with_min_chunk_chars(self.min_chunk_chars),
            ),
            ChunkingStrategy::Fixed => {
                Box::new(FixedSizeChunker::new(self.chunk_size, self.chunk_overlap)?)
            }
        })
    }
}

/// Reject chunking parameters no chunker can honor.
pub(crate) fn validate_chunking(chunk_size: usize, chunk_overlap: usize) -> Result<()> {
    if chunk_size == 0 {
        return Err(RagError::ConfigError("chunk_size must be greater than zero".to_string()));
    }
    if chunk_overlap >= chunk_size {
        return Err(RagError::ConfigError(format!(
            "chunk_overlap ({chunk_overlap}) must be less than chunk_size ({chunk_size})"
        )));
    }
    Ok(())
}

/// Builder for constructing a validated [`RagConfig`].
#[derive(Debug, Clone, Default)]
pub struct RagConfigBuilder {
    config: RagConfig,
}

impl RagConfigBuilder {
    /// Set the maximum chunk size in characters.
    pub fn chunk_size(mut self, size: usize) -> Self {
        self.config.chunk_size = size;
        self
    }

    /// Set the overlap between consecutive chunks in characters.
    pub fn chunk_overlap(mut self, overlap: usize) -> Self {
        self.config.chunk_overlap = overlap;
        self
    }

    /// Set the minimum trimmed length a structured chunk must have to be kept.
    pub fn min_chunk_chars(mut self, min: usize) -> Self {
        self.config.min_chunk_chars = min;
        self
    }

    /// Set the chunking strategy.
    pub fn strategy(mut self, strategy: ChunkingStrategy) -> Self {
        self.config.strategy = strategy;
        self
    }

    /// Set the number of top results to return from a query.
    pub fn top_k(mut self, k: usize) -> Self {
        self.config.top_k = k;
        self
    }

    /// Set the embedding batch size.
    pub fn batch_size(mut self, size: usize) -> Self {
        self.config.batch_size = size;
        self
    }

    /// Set how many embedding batches may run concurrently during a build.
    pub fn embed_concurrency(mut self, n: usize) -> Self {
        self.config.embed_concurrency = n;
        self
    }

    /// Set the context budget used by [`Retriever::answer_context`](crate::Retriever::answer_context).
    pub fn max_context_chars(mut self, max: usize) -> Self {
        self.config.max_context_chars = max;
        self
    }

    /// Build the [`RagConfig`], validating constraints.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::ConfigError`] if `chunk_overlap >= chunk_size`,
    /// or `chunk_size`, `top_k`, `batch_size` or `embed_concurrency` is zero.
    pub fn build(self) -> Result<RagConfig> {
        self.config.validate()?;
        Ok(self.config)
    }
}
