use docqa_rag::RagError;
use thiserror::Error;

use crate::session::SessionStatus;

/// Errors from session bookkeeping and document ingestion.
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("Session not found: {0}")]
    NotFound(String),

    #[error("Session {id} is not ready (status: {status})")]
    NotReady { id: String, status: SessionStatus },

    /// The extracted text is too short to be a real document.
    #[error("Invalid document: {0}")]
    InvalidDocument(String),

    /// A backing store failed.
    #[error("Session store error: {0}")]
    Store(String),

    #[error(transparent)]
    Rag(#[from] RagError),
}

pub type Result<T> = std::result::Result<T, SessionError>;
