//! # docqa-session
//!
//! Per-document sessions for docqa.
//!
//! A [`Session`] tracks one uploaded document through parsing, chunking, and
//! indexing. Sessions live in a [`SessionStore`]; [`DocumentIngestor`] moves
//! them through their stages and attaches the resulting
//! [`Retriever`](docqa_rag::Retriever) once the document is ready.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use docqa_rag::{HashingEmbeddingProvider, PlainTextExtractor, RagConfig};
//! use docqa_session::{DocumentIngestor, InMemorySessionStore, SessionStore};
//!
//! let store = Arc::new(InMemorySessionStore::new());
//! let ingestor = DocumentIngestor::new(
//!     store.clone(),
//!     Arc::new(PlainTextExtractor),
//!     Arc::new(HashingEmbeddingProvider::default()),
//!     RagConfig::default(),
//! );
//! let session = store.create("notes.txt").await?;
//! let session = ingestor.ingest(&session.id, "notes.txt").await?;
//! ```

pub mod error;
pub mod ingest;
pub mod session;
pub mod store;

pub use error::{Result, SessionError};
pub use ingest::{DocumentIngestor, MIN_DOCUMENT_CHARS};
pub use session::{Session, SessionStatus, SessionSummary};
pub use store::{InMemorySessionStore, SessionStore, ready_session};
