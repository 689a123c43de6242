//! Data types for documents, retrieval results, and document statistics.

use serde::{Deserialize, Serialize};

/// The full extracted text of one source document.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Document {
    /// Unique identifier for the document.
    pub id: String,
    /// The extracted text. Never mutated once produced.
    pub text: String,
    /// Optional URI pointing to the original source.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source_uri: Option<String>,
}

impl Document {
    /// Create a document with no source URI.
    pub fn new(id: impl Into<String>, text: impl Into<String>) -> Self {
        Self { id: id.into(), text: text.into(), source_uri: None }
    }

    /// Attach the URI the text was extracted from.
    pub fn with_source_uri(mut self, uri: impl Into<String>) -> Self {
        self.source_uri = Some(uri.into());
        self
    }
}

/// A chunk returned by an index query, paired with its L2 distance to the query.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ScoredChunk {
    /// Position of the chunk in the sequence the index was built from.
    pub position: usize,
    /// The chunk text.
    pub text: String,
    /// Euclidean distance between the chunk and query embeddings (lower is closer).
    pub distance: f32,
}

/// The result of a retrieval: either some context, or an explicit marker that
/// nothing relevant was found so the caller can pick a fallback.
#[derive(Debug, Clone, PartialEq)]
pub enum RetrievalOutcome {
    /// Chunks ordered by ascending distance. Never empty.
    Context(Vec<ScoredChunk>),
    /// No index has been built, or the index holds no chunks.
    NoRelevantContext,
}

impl RetrievalOutcome {
    pub(crate) fn from_results(results: Vec<ScoredChunk>) -> Self {
        if results.is_empty() { Self::NoRelevantContext } else { Self::Context(results) }
    }

    /// The retrieved chunks, or an empty slice.
    pub fn chunks(&self) -> &[ScoredChunk] {
        match self {
            Self::Context(chunks) => chunks,
            Self::NoRelevantContext => &[],
        }
    }

    /// Whether any context was retrieved.
    pub fn has_context(&self) -> bool {
        matches!(self, Self::Context(_))
    }
}

/// Summary figures about a processed document.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DocumentStats {
    pub total_text_length: usize,
    pub total_chunks: usize,
    pub total_words: usize,
    pub average_chunk_size: usize,
    /// Rough page estimate, three chunks per page.
    pub estimated_pages: usize,
    /// `true` when every chunk fits in the summarizer's chunk budget.
    pub full_coverage: bool,
}

impl DocumentStats {
    /// Chunk count above which summaries only cover a prefix of the document.
    pub const SUMMARY_CHUNK_LIMIT: usize = 20;

    /// Compute statistics for a document's text and its chunks. Lengths are in characters.
    pub fn compute(text: &str, chunks: &[String]) -> Self {
        let total_chunks = chunks.len();
        let chunk_chars: usize = chunks.iter().map(|c| c.chars().count()).sum();
        let average_chunk_size = if total_chunks == 0 { 0 } else { chunk_chars / total_chunks };
        Self {
            total_text_length: text.chars().count(),
            total_chunks,
            total_words: chunks.iter().map(|c| c.split_whitespace().count()).sum(),
            average_chunk_size,
            estimated_pages: total_chunks / 3,
            full_coverage: total_chunks <= Self::SUMMARY_CHUNK_LIMIT,
        }
    }
}
