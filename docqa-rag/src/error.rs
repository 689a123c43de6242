//! Error types for the `docqa-rag` crate.

use thiserror::Error;

/// Errors that can occur while chunking, indexing, or retrieving.
#[derive(Debug, Error)]
pub enum RagError {
    /// An invalid configuration value, e.g. `chunk_overlap >= chunk_size`.
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// An error occurred during embedding generation.
    #[error("Embedding error ({provider}): {message}")]
    EmbeddingError {
        /// The embedding provider that produced the error.
        provider: String,
        /// A description of the failure.
        message: String,
    },

    /// A vector did not have the dimensionality of the index it was used with.
    #[error("Dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch {
        /// Dimensionality of the index.
        expected: usize,
        /// Dimensionality of the offending vector.
        actual: usize,
    },

    /// An index build was cancelled before it completed.
    #[error("Index build cancelled")]
    Cancelled,

    /// Text could not be extracted from a source document.
    #[error("Extraction error: {0}")]
    ExtractionError(String),

    /// An I/O error while reading a source document.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// A convenience result type for RAG operations.
pub type Result<T> = std::result::Result<T, RagError>;
