//! Shared builders for search and ingestion tests.

#![allow(dead_code)]

use std::sync::Arc;

use async_trait::async_trait;
use uuid::Uuid;

use docseek_core::{
    Document, DocumentRepository, EmbeddingBackend, Error, NewDocument, Result, Vector,
};
use docseek_db::InMemoryDocumentRepository;
use docseek_inference::MockEmbeddingBackend;
use docseek_search::{SearchConfig, SearchEngine};

/// Install a test-writer subscriber once; later calls are no-ops.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// Repository seeded with `(filename, text, embedding)` triples, in order.
pub async fn seeded_repository(
    docs: Vec<(&str, &str, Option<Vector>)>,
) -> Arc<InMemoryDocumentRepository> {
    let repo = Arc::new(InMemoryDocumentRepository::new());
    for (filename, text, embedding) in docs {
        let mut doc = NewDocument::new(filename, text);
        if let Some(embedding) = embedding {
            doc = doc.with_embedding(embedding);
        }
        repo.insert(doc).await.unwrap();
    }
    repo
}

pub fn engine(
    repo: Arc<dyn DocumentRepository>,
    backend: &MockEmbeddingBackend,
    config: SearchConfig,
) -> SearchEngine {
    SearchEngine::new(repo, Arc::new(backend.clone())).with_config(config)
}

/// Repository whose reads always fail.
pub struct UnavailableRepository;

#[async_trait]
impl DocumentRepository for UnavailableRepository {
    async fn insert(&self, _doc: NewDocument) -> Result<Document> {
        Err(Error::Internal("store unavailable".to_string()))
    }

    async fn list(&self) -> Result<Vec<Document>> {
        Err(Error::Internal("store unavailable".to_string()))
    }

    async fn get(&self, id: Uuid) -> Result<Document> {
        Err(Error::NotFound(format!("Document {} not found", id)))
    }

    async fn delete(&self, _id: Uuid) -> Result<()> {
        Err(Error::Internal("store unavailable".to_string()))
    }
}

/// Backend that drops the last vector of every batch.
pub struct ShortBatchBackend;

#[async_trait]
impl EmbeddingBackend for ShortBatchBackend {
    async fn embed_texts(&self, texts: &[String]) -> Result<Vec<Vector>> {
        Ok(texts
            .iter()
            .skip(1)
            .map(|_| vec![1.0, 0.0])
            .collect())
    }

    fn dimension(&self) -> usize {
        2
    }

    fn model_name(&self) -> &str {
        "short-batch"
    }
}

/// Strip highlight tags from an excerpt.
pub fn strip_marks(s: &str) -> String {
    s.replace("<mark>", "").replace("</mark>", "")
}
