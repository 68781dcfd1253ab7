//! End-to-end search behavior against the in-memory repository and the mock
//! embedding backend.

mod helpers;

use std::sync::Arc;
use std::time::Duration;

use docseek_core::defaults::{MSG_NO_DOCUMENTS, MSG_NO_MATCHES, MSG_NO_SIMILAR};
use docseek_core::{Error, SearchMode};
use docseek_db::InMemoryDocumentRepository;
use docseek_inference::MockEmbeddingBackend;
use docseek_search::SearchConfig;

use helpers::{engine, init_tracing, seeded_repository, strip_marks, UnavailableRepository};

const FOX: &str = "The quick brown fox jumps over the lazy dog";

// ============================================================================
// Validation and empty corpus
// ============================================================================

#[tokio::test]
async fn test_blank_query_rejected_without_embedding() {
    init_tracing();
    let backend = MockEmbeddingBackend::new();
    let repo = seeded_repository(vec![("fox.txt", FOX, Some(vec![1.0, 0.0]))]).await;
    let engine = engine(repo, &backend, SearchConfig::default());

    for query in ["", "   ", "\n\t"] {
        let err = engine.search(query).await.unwrap_err();
        assert!(matches!(err, Error::MissingQuery));
        assert!(err.is_client_error());
    }
    assert_eq!(backend.call_count(), 0);
}

#[tokio::test]
async fn test_empty_corpus_returns_message_without_embedding() {
    let backend = MockEmbeddingBackend::new();
    let engine = engine(
        Arc::new(InMemoryDocumentRepository::new()),
        &backend,
        SearchConfig::default(),
    );

    let response = engine.search("anything").await.unwrap();
    assert!(response.results.is_empty());
    assert_eq!(response.message.as_deref(), Some(MSG_NO_DOCUMENTS));
    assert_eq!(backend.call_count(), 0);

    let response = engine
        .search_with_mode("anything", SearchMode::Literal)
        .await
        .unwrap();
    assert_eq!(response.message.as_deref(), Some(MSG_NO_DOCUMENTS));
}

#[tokio::test]
async fn test_repository_failure_aborts_search() {
    let backend = MockEmbeddingBackend::new();
    let engine = engine(Arc::new(UnavailableRepository), &backend, SearchConfig::default());

    let err = engine.search("fox").await.unwrap_err();
    assert!(matches!(err, Error::Repository(_)));
    assert!(!err.is_client_error());
    assert_eq!(backend.call_count(), 0);
}

// ============================================================================
// Literal mode
// ============================================================================

#[tokio::test]
async fn test_literal_search_excerpt_and_count() {
    let backend = MockEmbeddingBackend::new();
    let repo = seeded_repository(vec![
        ("fox.txt", FOX, None),
        ("cat.txt", "Cats sleep all day.", None),
    ])
    .await;
    let engine = engine(repo, &backend, SearchConfig::literal());

    let response = engine.search("fox").await.unwrap();
    assert_eq!(response.message, None);
    assert_eq!(response.results.len(), 1);

    let result = &response.results[0];
    assert_eq!(result.filename, "fox.txt");
    assert_eq!(result.matches, 1);
    assert_eq!(result.similarity, None);
    assert!(result
        .excerpt
        .contains("quick brown <mark>fox</mark> jumps over"));
    assert_eq!(strip_marks(&result.excerpt), FOX);

    // Literal mode never embeds.
    assert_eq!(backend.call_count(), 0);
}

#[tokio::test]
async fn test_literal_search_is_case_sensitive_by_default() {
    let backend = MockEmbeddingBackend::new();
    let repo = seeded_repository(vec![("fox.txt", "The Quick Fox", None)]).await;
    let engine = engine(repo, &backend, SearchConfig::literal());

    let response = engine.search("quick").await.unwrap();
    assert!(response.is_empty());
    assert_eq!(response.message.as_deref(), Some(MSG_NO_MATCHES));
}

#[tokio::test]
async fn test_literal_search_case_insensitive_when_configured() {
    let backend = MockEmbeddingBackend::new();
    let repo = seeded_repository(vec![("fox.txt", "The Quick Fox. A quick escape.", None)]).await;
    let engine = engine(
        repo,
        &backend,
        SearchConfig::literal().with_literal_case_sensitive(false),
    );

    let response = engine.search("quick").await.unwrap();
    assert_eq!(response.results.len(), 1);
    assert_eq!(response.results[0].matches, 2);
    assert!(response.results[0].excerpt.contains("<mark>Quick</mark>"));
}

#[tokio::test]
async fn test_literal_search_counts_case_insensitively() {
    let backend = MockEmbeddingBackend::new();
    let repo = seeded_repository(vec![("fox.txt", "fox Fox FOX", None)]).await;
    let engine = engine(repo, &backend, SearchConfig::literal());

    let response = engine.search("fox").await.unwrap();
    assert_eq!(response.results[0].matches, 3);
}

#[tokio::test]
async fn test_literal_search_metacharacters_are_literal() {
    let backend = MockEmbeddingBackend::new();
    let repo = seeded_repository(vec![
        ("dots.txt", "version 1.2 released", None),
        ("plain.txt", "version 102 released", None),
    ])
    .await;
    let engine = engine(
        repo,
        &backend,
        SearchConfig::literal().with_literal_case_sensitive(false),
    );

    let response = engine.search("1.2").await.unwrap();
    assert_eq!(response.results.len(), 1);
    assert_eq!(response.results[0].filename, "dots.txt");
}

#[tokio::test]
async fn test_literal_search_respects_limit_in_insertion_order() {
    let backend = MockEmbeddingBackend::new();
    let repo = seeded_repository(vec![
        ("a.txt", "rust one", None),
        ("b.txt", "rust two", None),
        ("c.txt", "rust three", None),
    ])
    .await;
    let engine = engine(repo, &backend, SearchConfig::literal().with_limit(2));

    let names: Vec<_> = engine
        .search("rust")
        .await
        .unwrap()
        .results
        .into_iter()
        .map(|r| r.filename)
        .collect();
    assert_eq!(names, vec!["a.txt", "b.txt"]);
}

// ============================================================================
// Semantic mode
// ============================================================================

#[tokio::test]
async fn test_semantic_search_filters_by_threshold() {
    init_tracing();
    let backend = MockEmbeddingBackend::new().with_fixed_vector("vectors", vec![1.0, 2.0, 3.0]);
    let repo = seeded_repository(vec![
        ("same.txt", "aligned document", Some(vec![1.0, 2.0, 3.0])),
        ("opposite.txt", "opposed document", Some(vec![-1.0, -2.0, -3.0])),
    ])
    .await;
    let engine = engine(repo, &backend, SearchConfig::default());

    let response = engine.search("vectors").await.unwrap();
    assert_eq!(response.results.len(), 1);

    let result = &response.results[0];
    assert_eq!(result.filename, "same.txt");
    let similarity = result.similarity.unwrap();
    assert!((similarity - 1.0).abs() < 1e-5);
    // Query text is absent from the document: no matches, leading excerpt.
    assert_eq!(result.matches, 0);
    assert_eq!(result.excerpt, "aligned document...");

    assert_eq!(backend.query_call_count(), 1);
}

#[tokio::test]
async fn test_semantic_search_sorted_descending_with_limit() {
    let backend = MockEmbeddingBackend::new().with_fixed_vector("q", vec![1.0, 0.0]);
    let repo = seeded_repository(vec![
        ("mid.txt", "mid", Some(vec![1.0, 1.0])),
        ("best.txt", "best", Some(vec![1.0, 0.0])),
        ("good.txt", "good", Some(vec![1.0, 0.5])),
    ])
    .await;
    let engine = engine(repo, &backend, SearchConfig::default().with_limit(2));

    let response = engine.search("q").await.unwrap();
    let names: Vec<_> = response.results.iter().map(|r| r.filename.as_str()).collect();
    assert_eq!(names, vec!["best.txt", "good.txt"]);
    assert!(response.results[0].similarity >= response.results[1].similarity);
}

#[tokio::test]
async fn test_semantic_search_excludes_incomparable_documents() {
    init_tracing();
    let backend = MockEmbeddingBackend::new().with_fixed_vector("q", vec![1.0, 0.0]);
    let repo = seeded_repository(vec![
        ("wide.txt", "three dimensions", Some(vec![1.0, 0.0, 0.0])),
        ("none.txt", "never embedded", None),
        ("zero.txt", "zero vector", Some(vec![0.0, 0.0])),
        ("match.txt", "two dimensions", Some(vec![1.0, 0.0])),
    ])
    .await;
    // Even a threshold that admits every real score drops incomparable ones.
    let engine = engine(repo, &backend, SearchConfig::default().with_threshold(-1.0));

    let response = engine.search("q").await.unwrap();
    assert_eq!(response.results.len(), 1);
    assert_eq!(response.results[0].filename, "match.txt");
}

#[tokio::test]
async fn test_semantic_search_keeps_orthogonal_at_zero_threshold() {
    let backend = MockEmbeddingBackend::new().with_fixed_vector("q", vec![1.0, 0.0]);
    let repo = seeded_repository(vec![("orth.txt", "orthogonal", Some(vec![0.0, 1.0]))]).await;
    let engine = engine(repo, &backend, SearchConfig::default().with_threshold(0.0));

    let response = engine.search("q").await.unwrap();
    assert_eq!(response.results.len(), 1);
    assert_eq!(response.results[0].similarity, Some(0.0));
}

#[tokio::test]
async fn test_semantic_search_no_similar_message() {
    let backend = MockEmbeddingBackend::new().with_fixed_vector("q", vec![1.0, 0.0]);
    let repo = seeded_repository(vec![("far.txt", "far away", Some(vec![-1.0, 0.1]))]).await;
    let engine = engine(repo, &backend, SearchConfig::default());

    let response = engine.search("q").await.unwrap();
    assert!(response.results.is_empty());
    assert_eq!(response.message.as_deref(), Some(MSG_NO_SIMILAR));
}

#[tokio::test]
async fn test_semantic_search_highlights_query_in_excerpt() {
    let backend = MockEmbeddingBackend::new().with_fixed_vector("fox", vec![1.0, 0.0]);
    let repo = seeded_repository(vec![("fox.txt", FOX, Some(vec![1.0, 0.1]))]).await;
    let engine = engine(repo, &backend, SearchConfig::default());

    let response = engine.search("fox").await.unwrap();
    let result = &response.results[0];
    assert_eq!(result.matches, 1);
    assert!(result
        .excerpt
        .contains("quick brown <mark>fox</mark> jumps over"));
}

// ============================================================================
// Embedding failures
// ============================================================================

#[tokio::test]
async fn test_embedding_failure_is_an_error_not_a_fallback() {
    let backend = MockEmbeddingBackend::new().failing();
    let repo = seeded_repository(vec![("fox.txt", FOX, Some(vec![1.0, 0.0]))]).await;
    let engine = engine(repo, &backend, SearchConfig::default());

    let err = engine.search("fox").await.unwrap_err();
    assert!(matches!(err, Error::Embedding(_)));
    assert!(!err.is_client_error());
}

#[tokio::test(start_paused = true)]
async fn test_embedding_timeout() {
    let backend = MockEmbeddingBackend::new().with_latency_ms(60_000);
    let repo = seeded_repository(vec![("fox.txt", FOX, Some(vec![1.0, 0.0]))]).await;
    let engine = engine(
        repo,
        &backend,
        SearchConfig::default().with_embed_timeout(Duration::from_secs(1)),
    );

    let err = engine.search("fox").await.unwrap_err();
    match err {
        Error::Embedding(msg) => assert!(msg.contains("timed out"), "unexpected: {}", msg),
        other => panic!("expected embedding error, got {:?}", other),
    }
}

#[tokio::test]
async fn test_malformed_query_embedding_rejected() {
    let repo = seeded_repository(vec![("fox.txt", FOX, Some(vec![1.0, 0.0]))]).await;

    let backend = MockEmbeddingBackend::new().with_fixed_vector("empty", vec![]);
    let engine_empty = engine(repo.clone(), &backend, SearchConfig::default());
    assert!(matches!(
        engine_empty.search("empty").await,
        Err(Error::Embedding(_))
    ));

    let backend = MockEmbeddingBackend::new().with_fixed_vector("nan", vec![f32::NAN, 1.0]);
    let engine_nan = engine(repo, &backend, SearchConfig::default());
    assert!(matches!(
        engine_nan.search("nan").await,
        Err(Error::Embedding(_))
    ));
}
