//! Tests for session storage and document ingestion.

use std::io::Write;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use docqa_rag::{
    CancellationToken, EmbeddingProvider, HashingEmbeddingProvider, PlainTextExtractor, RagConfig,
    RagError,
};
use docqa_session::{
    DocumentIngestor, InMemorySessionStore, SessionError, SessionStatus, SessionStore,
    ready_session,
};

fn document() -> String {
    let paragraphs = [
        "Photosynthesis converts light energy into chemical energy stored in glucose. \
         It takes place in the chloroplasts of plant cells.",
        "Cellular respiration releases the energy stored in glucose. \
         Mitochondria are the site of most of this process.",
        "The water cycle moves water between oceans, the atmosphere, and land. \
         Evaporation and precipitation drive the cycle.",
    ];
    paragraphs.join("\n\n")
}

fn ingestor(store: Arc<InMemorySessionStore>, provider: Arc<dyn EmbeddingProvider>) -> DocumentIngestor {
    let config = RagConfig::builder().chunk_size(200).chunk_overlap(0).top_k(1).build().unwrap();
    DocumentIngestor::new(store, Arc::new(PlainTextExtractor), provider, config)
}

fn text_file(contents: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(contents.as_bytes()).unwrap();
    file
}

struct BrokenProvider;

#[async_trait]
impl EmbeddingProvider for BrokenProvider {
    async fn embed(&self, _text: &str) -> docqa_rag::Result<Vec<f32>> {
        Err(RagError::EmbeddingError {
            provider: "Broken".to_string(),
            message: "model offline".to_string(),
        })
    }

    fn dimensions(&self) -> usize {
        4
    }

    fn model_id(&self) -> &str {
        "broken"
    }
}

/// Cancels the ingestion token while embedding its first batch.
struct CancelDuringIndexing {
    inner: HashingEmbeddingProvider,
    token: CancellationToken,
    batches: AtomicUsize,
}

#[async_trait]
impl EmbeddingProvider for CancelDuringIndexing {
    async fn embed(&self, text: &str) -> docqa_rag::Result<Vec<f32>> {
        self.inner.embed(text).await
    }

    async fn embed_batch(&self, texts: &[&str]) -> docqa_rag::Result<Vec<Vec<f32>>> {
        self.batches.fetch_add(1, Ordering::SeqCst);
        self.token.cancel();
        self.inner.embed_batch(texts).await
    }

    fn dimensions(&self) -> usize {
        self.inner.dimensions()
    }

    fn model_id(&self) -> &str {
        self.inner.model_id()
    }
}

#[tokio::test]
async fn ingest_makes_session_ready() {
    let store = Arc::new(InMemorySessionStore::new());
    let ingestor = ingestor(store.clone(), Arc::new(HashingEmbeddingProvider::default()));
    let file = text_file(&document());

    let session = store.create("biology.txt").await.unwrap();
    let ingested = ingestor.ingest(&session.id, file.path()).await.unwrap();

    assert_eq!(ingested.status, SessionStatus::Ready);
    assert_eq!(ingested.progress, 100);
    assert_eq!(ingested.chunks.len(), 3);
    let stats = ingested.stats.as_ref().unwrap();
    assert_eq!(stats.total_chunks, 3);
    assert!(stats.full_coverage);

    let stored = ready_session(store.as_ref(), &session.id).await.unwrap();
    let retriever = stored.retriever.unwrap();
    let outcome = retriever.retrieve("mitochondria respiration", 1).await.unwrap();
    assert!(outcome.chunks()[0].text.contains("Mitochondria"));
}

#[tokio::test]
async fn short_document_is_rejected() {
    let store = Arc::new(InMemorySessionStore::new());
    let ingestor = ingestor(store.clone(), Arc::new(HashingEmbeddingProvider::default()));
    let file = text_file("   too short   ");

    let session = store.create("empty.txt").await.unwrap();
    let err = ingestor.ingest(&session.id, file.path()).await.unwrap_err();
    assert!(matches!(err, SessionError::InvalidDocument(_)));

    let stored = store.get(&session.id).await.unwrap().unwrap();
    assert_eq!(stored.status, SessionStatus::Error);
    assert!(stored.error.unwrap().contains("empty or corrupted"));
    assert!(stored.retriever.is_none());
}

#[tokio::test]
async fn missing_file_marks_session_failed() {
    let store = Arc::new(InMemorySessionStore::new());
    let ingestor = ingestor(store.clone(), Arc::new(HashingEmbeddingProvider::default()));
    let dir = tempfile::tempdir().unwrap();

    let session = store.create("gone.txt").await.unwrap();
    let err = ingestor.ingest(&session.id, dir.path().join("gone.txt")).await.unwrap_err();
    assert!(matches!(err, SessionError::Rag(RagError::Io(_))));

    let stored = store.get(&session.id).await.unwrap().unwrap();
    assert_eq!(stored.status, SessionStatus::Error);
}

#[tokio::test]
async fn embedding_failure_marks_session_failed() {
    let store = Arc::new(InMemorySessionStore::new());
    let ingestor = ingestor(store.clone(), Arc::new(BrokenProvider));

    let session = store.create("biology.txt").await.unwrap();
    let err = ingestor.ingest_text(&session.id, &document()).await.unwrap_err();
    assert!(matches!(err, SessionError::Rag(RagError::EmbeddingError { .. })));

    let stored = store.get(&session.id).await.unwrap().unwrap();
    assert_eq!(stored.status, SessionStatus::Error);
    assert_eq!(stored.progress, 70);
    assert!(stored.error.unwrap().contains("model offline"));
}

#[tokio::test]
async fn cancelled_ingest_marks_session_failed_without_retriever() {
    let store = Arc::new(InMemorySessionStore::new());
    let token = CancellationToken::new();
    let provider = Arc::new(CancelDuringIndexing {
        inner: HashingEmbeddingProvider::default(),
        token: token.clone(),
        batches: AtomicUsize::new(0),
    });
    let config = RagConfig::builder()
        .chunk_size(200)
        .chunk_overlap(0)
        .batch_size(1)
        .build()
        .unwrap();
    let ingestor =
        DocumentIngestor::new(store.clone(), Arc::new(PlainTextExtractor), provider.clone(), config);
    let file = text_file(&document());

    let session = store.create("biology.txt").await.unwrap();
    let err = ingestor.ingest_with_cancellation(&session.id, file.path(), &token).await.unwrap_err();
    assert!(matches!(err, SessionError::Rag(RagError::Cancelled)));
    assert_eq!(provider.batches.load(Ordering::SeqCst), 1);

    let stored = store.get(&session.id).await.unwrap().unwrap();
    assert_eq!(stored.status, SessionStatus::Error);
    assert_eq!(stored.progress, 70);
    assert!(stored.error.is_some());
    assert!(stored.retriever.is_none());
    assert!(stored.chunks.is_empty());
}

#[tokio::test]
async fn unknown_session_is_not_found() {
    let store = Arc::new(InMemorySessionStore::new());
    let ingestor = ingestor(store.clone(), Arc::new(HashingEmbeddingProvider::default()));

    let err = ingestor.ingest_text("missing", &document()).await.unwrap_err();
    assert!(matches!(err, SessionError::NotFound(id) if id == "missing"));
}

#[tokio::test]
async fn ready_session_requires_ready_status() {
    let store = InMemorySessionStore::new();
    let session = store.create("pending.pdf").await.unwrap();

    match ready_session(&store, &session.id).await.unwrap_err() {
        SessionError::NotReady { status, .. } => assert_eq!(status, SessionStatus::Uploading),
        other => panic!("unexpected error: {other}"),
    }
    assert!(matches!(
        ready_session(&store, "nope").await.unwrap_err(),
        SessionError::NotFound(_)
    ));
}

#[tokio::test]
async fn list_update_and_delete() {
    let store = InMemorySessionStore::new();
    let first = store.create("a.pdf").await.unwrap();
    let second = store.create("b.pdf").await.unwrap();

    let listed = store.list().await.unwrap();
    assert_eq!(listed.len(), 2);
    assert!(listed.iter().any(|s| s.id == first.id && s.filename == "a.pdf"));

    assert!(store.delete(&first.id).await.unwrap());
    assert!(!store.delete(&first.id).await.unwrap());
    assert!(matches!(store.update(first).await.unwrap_err(), SessionError::NotFound(_)));

    let listed = store.list().await.unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].id, second.id);
}
