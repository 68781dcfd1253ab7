//! Core traits for docseek abstractions.
//!
//! These traits are the seams to external collaborators: the embedding
//! generator, the document store, and text extractors. Concrete
//! implementations live in other crates, which keeps the search pipeline
//! free of module-level state and testable with in-memory doubles.

use async_trait::async_trait;
use uuid::Uuid;

use crate::error::{Error, Result};
use crate::models::{Document, NewDocument, Vector};

// =============================================================================
// DOCUMENT REPOSITORY
// =============================================================================

/// Repository for stored documents.
#[async_trait]
pub trait DocumentRepository: Send + Sync {
    /// Insert a document, assigning its id and upload timestamp.
    async fn insert(&self, doc: NewDocument) -> Result<Document>;

    /// Snapshot of every stored document, in insertion order.
    async fn list(&self) -> Result<Vec<Document>>;

    /// Fetch one document by id.
    async fn get(&self, id: Uuid) -> Result<Document>;

    /// Delete a document. Unknown ids yield `Error::NotFound`.
    async fn delete(&self, id: Uuid) -> Result<()>;
}

// =============================================================================
// INFERENCE
// =============================================================================

/// Backend for generating text embeddings.
#[async_trait]
pub trait EmbeddingBackend: Send + Sync {
    /// Generate embeddings for the given texts (document side).
    ///
    /// Returns one embedding vector per input text, in input order.
    async fn embed_texts(&self, texts: &[String]) -> Result<Vec<Vector>>;

    /// Embed a single document text.
    async fn embed(&self, text: &str) -> Result<Vector> {
        self.embed_texts(&[text.to_string()])
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| Error::Embedding("Backend returned no embedding".to_string()))
    }

    /// Embed a search query.
    ///
    /// Asymmetric models (e.g. Cohere v3) override this to request a
    /// query-side embedding; symmetric models use the document path.
    async fn embed_query(&self, query: &str) -> Result<Vector> {
        self.embed(query).await
    }

    /// Get the expected dimension of embedding vectors.
    fn dimension(&self) -> usize;

    /// Get the model name being used.
    fn model_name(&self) -> &str;
}

// =============================================================================
// EXTRACTION
// =============================================================================

/// Produces raw text from uploaded bytes.
pub trait TextExtractor: Send + Sync {
    /// Whether this extractor handles the given MIME type.
    fn supports(&self, mime_type: &str) -> bool;

    /// File extensions (lowercase, no dot) this extractor accepts.
    fn extensions(&self) -> &[&str];

    /// Extract raw text.
    fn extract(&self, bytes: &[u8]) -> Result<String>;

    /// Extractor name for logging.
    fn name(&self) -> &str;
}
