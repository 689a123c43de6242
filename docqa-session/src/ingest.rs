//! Document ingestion: extract, chunk, and index a session's document.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use docqa_rag::{
    CancellationToken, DocumentStats, EmbeddingProvider, RagConfig, RagError, Retriever,
    TextExtractor,
};
use tracing::{debug, error, info};

use crate::error::{Result, SessionError};
use crate::session::{Session, SessionStatus};
use crate::store::SessionStore;

/// Documents whose trimmed text is shorter than this are rejected.
pub const MIN_DOCUMENT_CHARS: usize = 100;

/// Drives a session from upload to [`SessionStatus::Ready`].
///
/// Each stage is written back to the store before it starts, so concurrent
/// readers can follow progress: parsing at 20%, chunking at 40%, indexing at
/// 70%, and ready at 100%. Any failure leaves the session in
/// [`SessionStatus::Error`] with the failure message.
///
/// # Example
///
/// ```rust,ignore
/// let ingestor = DocumentIngestor::new(store.clone(), Arc::new(PdfTextExtractor), provider, config);
/// let session = store.create("report.pdf").await?;
/// let session = ingestor.ingest(&session.id, "report.pdf").await?;
/// assert!(session.is_ready());
/// ```
pub struct DocumentIngestor {
    store: Arc<dyn SessionStore>,
    extractor: Arc<dyn TextExtractor>,
    embedding_provider: Arc<dyn EmbeddingProvider>,
    config: RagConfig,
}

impl DocumentIngestor {
    pub fn new(
        store: Arc<dyn SessionStore>,
        extractor: Arc<dyn TextExtractor>,
        embedding_provider: Arc<dyn EmbeddingProvider>,
        config: RagConfig,
    ) -> Self {
        Self { store, extractor, embedding_provider, config }
    }

    pub fn store(&self) -> &Arc<dyn SessionStore> {
        &self.store
    }

    /// Extract, chunk, and index the file at `path` for session `id`.
    ///
    /// # Errors
    ///
    /// [`SessionError::NotFound`] if the session does not exist,
    /// [`SessionError::InvalidDocument`] if too little text was extracted, or
    /// any extraction or indexing failure.
    pub async fn ingest(&self, id: &str, path: impl AsRef<Path>) -> Result<Session> {
        self.ingest_with_cancellation(id, path, &CancellationToken::new()).await
    }

    /// Like [`ingest`](Self::ingest), abandoning indexing once `cancel` fires.
    pub async fn ingest_with_cancellation(
        &self,
        id: &str,
        path: impl AsRef<Path>,
        cancel: &CancellationToken,
    ) -> Result<Session> {
        let path = path.as_ref().to_path_buf();
        let result: Result<Session> = async {
            self.advance(id, SessionStatus::Parsing, 20).await?;
            let text = self.extract(path).await?;
            self.index_text(id, &text, cancel).await
        }
        .await;
        self.settle(id, result).await
    }

    /// Chunk and index text that has already been extracted.
    ///
    /// # Errors
    ///
    /// Same as [`ingest`](Self::ingest), minus extraction failures.
    pub async fn ingest_text(&self, id: &str, text: &str) -> Result<Session> {
        let cancel = CancellationToken::new();
        let result: Result<Session> = async {
            self.advance(id, SessionStatus::Parsing, 20).await?;
            self.index_text(id, text, &cancel).await
        }
        .await;
        self.settle(id, result).await
    }

    async fn extract(&self, path: PathBuf) -> Result<String> {
        let extractor = Arc::clone(&self.extractor);
        let text = tokio::task::spawn_blocking(move || extractor.extract_text(&path))
            .await
            .map_err(|e| RagError::ExtractionError(format!("extraction task failed: {e}")))??;
        debug!(chars = text.chars().count(), "extracted document text");
        Ok(text)
    }

    async fn index_text(&self, id: &str, text: &str, cancel: &CancellationToken) -> Result<Session> {
        if text.trim().chars().count() < MIN_DOCUMENT_CHARS {
            return Err(SessionError::InvalidDocument(
                "document appears to be empty or corrupted".to_string(),
            ));
        }

        self.advance(id, SessionStatus::Chunking, 40).await?;
        let retriever = Retriever::new(self.config.clone(), Arc::clone(&self.embedding_provider))?;
        let chunks = retriever.chunk(text);
        let stats = DocumentStats::compute(text, &chunks);

        self.advance(id, SessionStatus::Indexing, 70).await?;
        retriever.index_chunks(chunks.clone(), cancel).await?;

        let mut session = self.load(id).await?;
        session.status = SessionStatus::Ready;
        session.progress = 100;
        session.error = None;
        session.stats = Some(stats);
        session.chunks = Arc::new(chunks);
        session.retriever = Some(Arc::new(retriever));
        self.store.update(session.clone()).await?;

        info!(session_id = id, chunk_count = session.chunks.len(), "session ready");
        Ok(session)
    }

    async fn advance(&self, id: &str, status: SessionStatus, progress: u8) -> Result<()> {
        let mut session = self.load(id).await?;
        session.status = status;
        session.progress = progress;
        self.store.update(session).await?;
        debug!(session_id = id, %status, progress, "session advanced");
        Ok(())
    }

    async fn load(&self, id: &str) -> Result<Session> {
        self.store.get(id).await?.ok_or_else(|| SessionError::NotFound(id.to_string()))
    }

    /// Record a failure on the session, if it still exists, and pass the result through.
    async fn settle(&self, id: &str, result: Result<Session>) -> Result<Session> {
        let err = match result {
            Ok(session) => return Ok(session),
            Err(err) => err,
        };

        error!(session_id = id, error = %err, "ingestion failed");
        if let Ok(Some(mut session)) = self.store.get(id).await {
            session.status = SessionStatus::Error;
            session.error = Some(err.to_string());
            if let Err(update_err) = self.store.update(session).await {
                error!(session_id = id, error = %update_err, "failed to record ingestion error");
            }
        }
        Err(err)
    }
}
