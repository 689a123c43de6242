//! # docqa-rag
//!
//! Chunking and retrieval for document question answering.
//!
//! ## Overview
//!
//! This crate turns the extracted text of one document into an index that can
//! ground answers and summaries:
//!
//! - [`StructuredChunker`] / [`FixedSizeChunker`] - split text into overlapping chunks
//! - [`EmbeddingProvider`] - the embedding seam ([`HashingEmbeddingProvider`],
//!   and `OllamaEmbeddingProvider` with the `ollama` feature)
//! - [`EmbeddingIndex`] - immutable exact L2 nearest-neighbor index
//! - [`Retriever`] - owns a document's index and assembles answer context
//! - [`TextExtractor`] - the extraction seam (`PdfTextExtractor` with the `pdf` feature)
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use docqa_rag::{HashingEmbeddingProvider, RagConfig, Retriever};
//!
//! let retriever = Retriever::new(RagConfig::default(), Arc::new(HashingEmbeddingProvider::default()))?;
//! let index = retriever.process(&text).await?;
//! let outcome = docqa_rag::retrieve(&index, "what is covered?", 5).await?;
//! ```
//!
//! ## Features
//!
//! - `ollama` (default) - embeddings from an Ollama server
//! - `pdf` (default) - PDF text extraction via `pdf-extract`

pub mod chunking;
pub mod config;
pub mod document;
pub mod embedding;
pub mod error;
pub mod extract;
pub mod hashing;
pub mod index;
pub mod retriever;

#[cfg(feature = "ollama")]
pub mod ollama;

pub use chunking::{Chunker, DEFAULT_MIN_CHUNK_CHARS, FixedSizeChunker, StructuredChunker, chunk, chunk_fixed};
pub use config::{ChunkingStrategy, RagConfig, RagConfigBuilder};
pub use document::{Document, DocumentStats, RetrievalOutcome, ScoredChunk};
pub use embedding::{DEFAULT_EMBEDDING_DIMENSIONS, DEFAULT_EMBEDDING_MODEL, EmbeddingProvider};
pub use error::{RagError, Result};
pub use extract::{NO_TEXT_PLACEHOLDER, PlainTextExtractor, TextExtractor};
pub use hashing::HashingEmbeddingProvider;
pub use index::{BuildOptions, EmbeddingIndex};
pub use retriever::{Retriever, retrieve};

#[cfg(feature = "ollama")]
pub use ollama::{DEFAULT_OLLAMA_URL, OllamaEmbeddingProvider};

#[cfg(feature = "pdf")]
pub use extract::PdfTextExtractor;

pub use tokio_util::sync::CancellationToken;
