//! Session records.

use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use docqa_rag::{DocumentStats, Retriever};
use serde::{Deserialize, Serialize};

/// Processing stage of a session's document.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum SessionStatus {
    Uploading,
    Parsing,
    Chunking,
    Indexing,
    Ready,
    Error,
}

impl fmt::Display for SessionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Uploading => "uploading",
            Self::Parsing => "parsing",
            Self::Chunking => "chunking",
            Self::Indexing => "indexing",
            Self::Ready => "ready",
            Self::Error => "error",
        };
        f.write_str(name)
    }
}

/// One uploaded document and everything derived from it.
///
/// The retriever, and with it the document's index, belongs to the session and
/// is dropped when the session is deleted from its store.
#[derive(Clone)]
pub struct Session {
    pub id: String,
    pub filename: String,
    pub status: SessionStatus,
    /// Percent complete, 0 to 100.
    pub progress: u8,
    pub created_at: DateTime<Utc>,
    pub error: Option<String>,
    pub stats: Option<DocumentStats>,
    pub chunks: Arc<Vec<String>>,
    pub retriever: Option<Arc<Retriever>>,
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("id", &self.id)
            .field("filename", &self.filename)
            .field("status", &self.status)
            .field("progress", &self.progress)
            .field("error", &self.error)
            .field("chunk_count", &self.chunks.len())
            .field("has_retriever", &self.retriever.is_some())
            .finish()
    }
}

impl Session {
    /// A fresh session in the [`SessionStatus::Uploading`] state with a random id.
    pub fn new(filename: impl Into<String>) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            filename: filename.into(),
            status: SessionStatus::Uploading,
            progress: 0,
            created_at: Utc::now(),
            error: None,
            stats: None,
            chunks: Arc::new(Vec::new()),
            retriever: None,
        }
    }

    pub fn is_ready(&self) -> bool {
        self.status == SessionStatus::Ready
    }

    /// The first `max_chars` characters of the first chunk, with `...` if cut.
    pub fn first_chunk_preview(&self, max_chars: usize) -> Option<String> {
        let first = self.chunks.first()?;
        if first.chars().count() <= max_chars {
            return Some(first.clone());
        }
        let mut preview: String = first.chars().take(max_chars).collect();
        preview.push_str("...");
        Some(preview)
    }

    pub fn summary(&self) -> SessionSummary {
        SessionSummary {
            id: self.id.clone(),
            filename: self.filename.clone(),
            status: self.status,
            progress: self.progress,
            chunk_count: self.chunks.len(),
            created_at: self.created_at,
        }
    }
}

/// A serializable view of a [`Session`] for listings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SessionSummary {
    pub id: String,
    pub filename: String,
    pub status: SessionStatus,
    pub progress: u8,
    pub chunk_count: usize,
    pub created_at: DateTime<Utc>,
}
