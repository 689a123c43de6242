//! Retrieval orchestration over a single document.
//!
//! The [`Retriever`] coordinates the process-and-query workflow by composing a
//! [`Chunker`] selected from [`RagConfig`] with an [`EmbeddingProvider`]:
//! `process` chunks a document and builds its [`EmbeddingIndex`]; `retrieve`
//! and `answer_context` query the installed index.
//!
//! # Example
//!
//! ```rust,ignore
//! use docqa_rag::{RagConfig, Retriever, HashingEmbeddingProvider};
//!
//! let retriever = Retriever::new(RagConfig::default(), Arc::new(HashingEmbeddingProvider::default()))?;
//! retriever.process(&document_text).await?;
//! match retriever.answer_context("What does clause 4 say?", 2000).await? {
//!     Some(context) => { /* build an answer prompt */ }
//!     None => { /* fall back to summarizing */ }
//! }
//! ```

use std::sync::Arc;

use tokio::sync::RwLock;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::chunking::Chunker;
use crate::config::RagConfig;
use crate::document::{Document, RetrievalOutcome};
use crate::embedding::EmbeddingProvider;
use crate::error::Result;
use crate::index::{BuildOptions, EmbeddingIndex};

/// Appended after every chunk in an answer context.
const CONTEXT_SEPARATOR: &str = "\n\n";

/// Query `index` for the `top_k` chunks nearest to `query`.
///
/// Returns [`RetrievalOutcome::NoRelevantContext`] when the index is empty.
///
/// # Errors
///
/// Propagates embedding failures for the query text.
pub async fn retrieve(index: &EmbeddingIndex, query: &str, top_k: usize) -> Result<RetrievalOutcome> {
    let results = index.query(query, top_k).await?;
    debug!(result_count = results.len(), top_k, "retrieved chunks");
    Ok(RetrievalOutcome::from_results(results))
}

/// Owns the chunker, embedding provider and current index for one document.
///
/// The index slot only changes when a build succeeds, so a failed or
/// cancelled [`process`](Retriever::process) leaves the previous index (or
/// none) in place. Queries clone the `Arc` out of the slot and search without
/// holding the lock.
pub struct Retriever {
    config: RagConfig,
    chunker: Arc<dyn Chunker>,
    embedding_provider: Arc<dyn EmbeddingProvider>,
    index: RwLock<Option<Arc<EmbeddingIndex>>>,
}

impl Retriever {
    /// Create a retriever, selecting the chunker from `config.strategy`.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::ConfigError`](crate::RagError::ConfigError) if the
    /// configuration is invalid.
    pub fn new(config: RagConfig, embedding_provider: Arc<dyn EmbeddingProvider>) -> Result<Self> {
        config.validate()?;
        let chunker: Arc<dyn Chunker> = Arc::from(config.chunker()?);
        Ok(Self { config, chunker, embedding_provider, index: RwLock::new(None) })
    }

    /// Return a reference to the configuration.
    pub fn config(&self) -> &RagConfig {
        &self.config
    }

    /// Return a reference to the embedding provider.
    pub fn embedding_provider(&self) -> &Arc<dyn EmbeddingProvider> {
        &self.embedding_provider
    }

    /// Split `text` with the configured chunker.
    pub fn chunk(&self, text: &str) -> Vec<String> {
        self.chunker.chunk(text)
    }

    /// Chunk `document_text`, build its index, and install it.
    ///
    /// # Errors
    ///
    /// Propagates index build failures; the previously installed index is kept.
    pub async fn process(&self, document_text: &str) -> Result<Arc<EmbeddingIndex>> {
        self.process_with_cancellation(document_text, &CancellationToken::new()).await
    }

    /// [`process`](Self::process) the text of `document`.
    pub async fn process_document(&self, document: &Document) -> Result<Arc<EmbeddingIndex>> {
        debug!(document_id = %document.id, "processing document");
        self.process(&document.text).await
    }

    /// Like [`process`](Self::process), stopping at the next batch boundary
    /// once `cancel` fires.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::Cancelled`](crate::RagError::Cancelled) when
    /// cancelled, or any index build failure.
    pub async fn process_with_cancellation(
        &self,
        document_text: &str,
        cancel: &CancellationToken,
    ) -> Result<Arc<EmbeddingIndex>> {
        let chunks = self.chunker.chunk(document_text);
        self.index_chunks(chunks, cancel).await
    }

    /// Build and install an index over already-chunked text.
    ///
    /// # Errors
    ///
    /// Propagates index build failures; the previously installed index is kept.
    pub async fn index_chunks(
        &self,
        chunks: Vec<String>,
        cancel: &CancellationToken,
    ) -> Result<Arc<EmbeddingIndex>> {
        let chunk_count = chunks.len();
        let index = Arc::new(
            EmbeddingIndex::build_with(
                Arc::clone(&self.embedding_provider),
                chunks,
                BuildOptions::from(&self.config),
                cancel,
            )
            .await?,
        );

        *self.index.write().await = Some(Arc::clone(&index));
        info!(chunk_count, model = index.model_id(), "installed index");
        Ok(index)
    }

    /// The currently installed index, if any.
    pub async fn index(&self) -> Option<Arc<EmbeddingIndex>> {
        self.index.read().await.clone()
    }

    /// Query the installed index for the `top_k` nearest chunks.
    ///
    /// Returns [`RetrievalOutcome::NoRelevantContext`] when no index has been
    /// built or it holds no chunks.
    ///
    /// # Errors
    ///
    /// Propagates embedding failures for the query text.
    pub async fn retrieve(&self, query: &str, top_k: usize) -> Result<RetrievalOutcome> {
        match self.index().await {
            Some(index) => retrieve(&index, query, top_k).await,
            None => Ok(RetrievalOutcome::NoRelevantContext),
        }
    }

    /// Assemble context for answering `question`.
    ///
    /// Fetches `config.top_k` chunks and appends them in result order, each
    /// followed by a blank line, stopping before the first chunk that would
    /// push the context past `max_context_chars`. The trailing blank lines
    /// count toward the budget and chunks are never cut.
    ///
    /// Returns `None` when nothing was retrieved or not even the nearest
    /// chunk fits, signalling the caller to use a non-retrieval fallback.
    ///
    /// # Errors
    ///
    /// Propagates embedding failures for the question text.
    pub async fn answer_context(
        &self,
        question: &str,
        max_context_chars: usize,
    ) -> Result<Option<String>> {
        let outcome = self.retrieve(question, self.config.top_k).await?;

        let separator_len = CONTEXT_SEPARATOR.chars().count();
        let mut context = String::new();
        let mut context_len = 0;
        for chunk in outcome.chunks() {
            let entry_len = chunk.text.chars().count() + separator_len;
            if context_len + entry_len > max_context_chars {
                break;
            }
            context.push_str(&chunk.text);
            context.push_str(CONTEXT_SEPARATOR);
            context_len += entry_len;
        }

        Ok((!context.is_empty()).then_some(context))
    }
}
