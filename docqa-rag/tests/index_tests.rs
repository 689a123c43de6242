//! Tests for index build and nearest-neighbor search.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use docqa_rag::embedding::EmbeddingProvider;
use docqa_rag::error::{RagError, Result};
use docqa_rag::hashing::HashingEmbeddingProvider;
use docqa_rag::index::{BuildOptions, EmbeddingIndex};
use docqa_rag::CancellationToken;
use proptest::prelude::*;

/// Embeds a text as a fixed vector looked up by position in a table.
struct TableProvider {
    table: Vec<(String, Vec<f32>)>,
    calls: AtomicUsize,
}

impl TableProvider {
    fn new(table: Vec<(String, Vec<f32>)>) -> Self {
        Self { table, calls: AtomicUsize::new(0) }
    }
}

#[async_trait]
impl EmbeddingProvider for TableProvider {
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.table.iter().find(|(t, _)| t == text).map(|(_, v)| v.clone()).ok_or_else(|| {
            RagError::EmbeddingError { provider: "table".into(), message: format!("unknown text {text}") }
        })
    }

    fn dimensions(&self) -> usize {
        self.table.first().map_or(0, |(_, v)| v.len())
    }

    fn model_id(&self) -> &str {
        "table"
    }
}

/// Fails every batch after the first `ok_batches`.
struct FlakyProvider {
    ok_batches: usize,
    batches: AtomicUsize,
}

#[async_trait]
impl EmbeddingProvider for FlakyProvider {
    async fn embed(&self, _text: &str) -> Result<Vec<f32>> {
        Ok(vec![1.0, 0.0])
    }

    async fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>> {
        if self.batches.fetch_add(1, Ordering::SeqCst) >= self.ok_batches {
            return Err(RagError::EmbeddingError { provider: "flaky".into(), message: "boom".into() });
        }
        Ok(texts.iter().map(|_| vec![1.0, 0.0]).collect())
    }

    fn dimensions(&self) -> usize {
        2
    }

    fn model_id(&self) -> &str {
        "flaky"
    }
}

/// Returns vectors of the wrong size.
struct WrongDimensionProvider;

#[async_trait]
impl EmbeddingProvider for WrongDimensionProvider {
    async fn embed(&self, _text: &str) -> Result<Vec<f32>> {
        Ok(vec![0.0; 3])
    }

    fn dimensions(&self) -> usize {
        4
    }

    fn model_id(&self) -> &str {
        "wrong"
    }
}

/// Cancels its token from inside the first batch it embeds.
struct CancellingProvider {
    token: CancellationToken,
    batches: AtomicUsize,
}

#[async_trait]
impl EmbeddingProvider for CancellingProvider {
    async fn embed(&self, _text: &str) -> Result<Vec<f32>> {
        Ok(vec![0.0, 1.0])
    }

    async fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>> {
        self.batches.fetch_add(1, Ordering::SeqCst);
        self.token.cancel();
        Ok(texts.iter().map(|_| vec![0.0, 1.0]).collect())
    }

    fn dimensions(&self) -> usize {
        2
    }

    fn model_id(&self) -> &str {
        "cancelling"
    }
}

fn chunks(texts: &[&str]) -> Vec<String> {
    texts.iter().map(|t| t.to_string()).collect()
}

#[tokio::test]
async fn query_returns_exact_match_first() {
    let provider = Arc::new(HashingEmbeddingProvider::default());
    let corpus = chunks(&["a cat sat", "a dog ran", "the sky is blue"]);

    for _ in 0..3 {
        let index = EmbeddingIndex::build(provider.clone(), corpus.clone(), 32).await.unwrap();
        let results = index.query("a cat sat", 1).await.unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].text, "a cat sat");
        assert_eq!(results[0].position, 0);
        assert!(results[0].distance.abs() < 1e-6);
    }
}

#[tokio::test]
async fn empty_index_returns_nothing_without_embedding() {
    let provider = Arc::new(TableProvider::new(vec![("q".into(), vec![1.0])]));
    let index = EmbeddingIndex::build(provider.clone(), Vec::new(), 32).await.unwrap();

    assert!(index.is_empty());
    for top_k in [0, 1, 5, 100] {
        assert!(index.query("q", top_k).await.unwrap().is_empty());
        assert!(index.query("anything else", top_k).await.unwrap().is_empty());
    }
    assert_eq!(provider.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn top_k_larger_than_index_returns_every_chunk() {
    let provider = Arc::new(HashingEmbeddingProvider::new(32).unwrap());
    let index =
        EmbeddingIndex::build(provider, chunks(&["one", "two", "three"]), 2).await.unwrap();
    let results = index.query("two", 10).await.unwrap();
    assert_eq!(results.len(), 3);
    assert_eq!(results[0].text, "two");
}

#[tokio::test]
async fn results_are_ordered_by_distance_then_position() {
    let table = vec![
        ("far".to_string(), vec![10.0, 0.0]),
        ("near".to_string(), vec![1.0, 0.0]),
        ("tie-a".to_string(), vec![0.0, 3.0]),
        ("tie-b".to_string(), vec![0.0, 3.0]),
        ("query".to_string(), vec![0.0, 0.0]),
    ];
    let provider = Arc::new(TableProvider::new(table));
    let index = EmbeddingIndex::build(provider, chunks(&["far", "tie-a", "near", "tie-b"]), 3)
        .await
        .unwrap();

    let results = index.query("query", 4).await.unwrap();
    let order: Vec<&str> = results.iter().map(|r| r.text.as_str()).collect();
    assert_eq!(order, vec!["near", "tie-a", "tie-b", "far"]);
    assert_eq!(results[0].distance, 1.0);
    assert_eq!(results[3].distance, 10.0);
}

#[tokio::test]
async fn batching_does_not_change_vectors_or_order() {
    let provider = Arc::new(HashingEmbeddingProvider::new(64).unwrap());
    let corpus: Vec<String> = (0..70).map(|i| format!("chunk number {i} about topic {}", i % 7)).collect();

    let single = EmbeddingIndex::build(provider.clone(), corpus.clone(), 1).await.unwrap();
    let options = BuildOptions { batch_size: 16, concurrency: 4 };
    let batched =
        EmbeddingIndex::build_with(provider, corpus.clone(), options, &CancellationToken::new())
            .await
            .unwrap();

    assert_eq!(batched.chunks(), corpus.as_slice());
    let a = single.query("topic 3", 10).await.unwrap();
    let b = batched.query("topic 3", 10).await.unwrap();
    assert_eq!(a, b);
}

#[tokio::test]
async fn failed_batch_aborts_build() {
    let provider = Arc::new(FlakyProvider { ok_batches: 2, batches: AtomicUsize::new(0) });
    let corpus: Vec<String> = (0..10).map(|i| format!("chunk {i}")).collect();
    let err = EmbeddingIndex::build(provider, corpus, 3).await.unwrap_err();
    assert!(matches!(err, RagError::EmbeddingError { .. }));
}

#[tokio::test]
async fn wrong_dimension_aborts_build() {
    let err = EmbeddingIndex::build(Arc::new(WrongDimensionProvider), chunks(&["x"]), 8)
        .await
        .unwrap_err();
    assert!(matches!(err, RagError::DimensionMismatch { expected: 4, actual: 3 }));
}

#[tokio::test]
async fn cancelled_build_returns_no_index() {
    let token = CancellationToken::new();
    token.cancel();
    let provider = Arc::new(HashingEmbeddingProvider::default());
    let err = EmbeddingIndex::build_with(provider, chunks(&["a", "b"]), BuildOptions::default(), &token)
        .await
        .unwrap_err();
    assert!(matches!(err, RagError::Cancelled));
}

#[tokio::test]
async fn cancellation_mid_build_stops_at_next_batch_boundary() {
    let token = CancellationToken::new();
    let provider =
        Arc::new(CancellingProvider { token: token.clone(), batches: AtomicUsize::new(0) });
    let corpus: Vec<String> = (0..10).map(|i| format!("chunk {i}")).collect();
    let options = BuildOptions { batch_size: 2, concurrency: 1 };

    let err = EmbeddingIndex::build_with(provider.clone(), corpus, options, &token)
        .await
        .unwrap_err();

    assert!(matches!(err, RagError::Cancelled));
    assert_eq!(provider.batches.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn zero_batch_size_is_a_config_error() {
    let provider = Arc::new(HashingEmbeddingProvider::default());
    let err = EmbeddingIndex::build(provider, chunks(&["a"]), 0).await.unwrap_err();
    assert!(matches!(err, RagError::ConfigError(_)));
}

#[tokio::test]
async fn query_vector_checks_dimension() {
    let provider = Arc::new(HashingEmbeddingProvider::new(8).unwrap());
    let index = EmbeddingIndex::build(provider, chunks(&["a b c"]), 4).await.unwrap();
    let err = index.query_vector(&[0.0; 4], 1).unwrap_err();
    assert!(matches!(err, RagError::DimensionMismatch { expected: 8, actual: 4 }));
    assert_eq!(index.model_id(), "hashing-8");
}

/// Generate an embedding of the given dimension.
fn arb_embedding(dim: usize) -> impl Strategy<Value = Vec<f32>> {
    proptest::collection::vec(-1.0f32..1.0f32, dim)
}

/// *For any* set of embedded chunks, searching with a query vector returns
/// `min(top_k, len)` results ordered by ascending L2 distance.
mod prop_index_search_ordering {
    use super::*;

    const DIM: usize = 16;

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(100))]

        #[test]
        fn results_ordered_ascending_and_bounded_by_top_k(
            vectors in proptest::collection::vec(arb_embedding(DIM), 1..20),
            query in arb_embedding(DIM),
            top_k in 1usize..25,
            batch_size in 1usize..8,
        ) {
            let table: Vec<(String, Vec<f32>)> = vectors
                .iter()
                .enumerate()
                .map(|(i, v)| (format!("chunk-{i}"), v.clone()))
                .collect();
            let texts: Vec<String> = table.iter().map(|(t, _)| t.clone()).collect();
            let count = texts.len();

            let rt = tokio::runtime::Runtime::new().unwrap();
            let results = rt.block_on(async {
                let provider = Arc::new(TableProvider::new(table));
                let index = EmbeddingIndex::build(provider, texts, batch_size).await.unwrap();
                index.query_vector(&query, top_k).unwrap()
            });

            prop_assert_eq!(results.len(), top_k.min(count));
            for window in results.windows(2) {
                prop_assert!(
                    window[0].distance <= window[1].distance,
                    "results not in ascending order: {} > {}",
                    window[0].distance,
                    window[1].distance,
                );
            }
            for result in &results {
                prop_assert_eq!(&result.text, &format!("chunk-{}", result.position));
            }
        }
    }
}
