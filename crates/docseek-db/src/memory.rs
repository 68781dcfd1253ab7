//! In-memory document repository.
//!
//! Holds documents in insertion order behind an async `RwLock`. Reads hand
//! out cloned snapshots, so a search never holds the lock across an await.

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;
use tracing::{debug, info};
use uuid::Uuid;

use docseek_core::{new_v7, Document, DocumentRepository, Error, NewDocument, Result};

/// Process-local document store.
#[derive(Debug, Default)]
pub struct InMemoryDocumentRepository {
    documents: RwLock<Vec<Document>>,
}

impl InMemoryDocumentRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed the store with existing documents, keeping their ids.
    pub fn with_documents(documents: Vec<Document>) -> Self {
        Self {
            documents: RwLock::new(documents),
        }
    }

    /// Number of stored documents.
    pub async fn len(&self) -> usize {
        self.documents.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.documents.read().await.is_empty()
    }
}

#[async_trait]
impl DocumentRepository for InMemoryDocumentRepository {
    async fn insert(&self, doc: NewDocument) -> Result<Document> {
        let document = Document {
            id: new_v7(),
            filename: doc.filename,
            text: doc.text,
            embedding: doc.embedding,
            uploaded_at: Utc::now(),
        };

        let mut documents = self.documents.write().await;
        documents.push(document.clone());

        info!(
            subsystem = "db",
            component = "memory",
            op = "insert",
            doc_id = %document.id,
            filename = %document.filename,
            doc_count = documents.len(),
            "Document stored"
        );
        Ok(document)
    }

    async fn list(&self) -> Result<Vec<Document>> {
        let documents = self.documents.read().await;
        debug!(
            subsystem = "db",
            component = "memory",
            op = "list",
            doc_count = documents.len(),
            "Listing documents"
        );
        Ok(documents.clone())
    }

    async fn get(&self, id: Uuid) -> Result<Document> {
        self.documents
            .read()
            .await
            .iter()
            .find(|d| d.id == id)
            .cloned()
            .ok_or_else(|| Error::NotFound(format!("Document {} not found", id)))
    }

    async fn delete(&self, id: Uuid) -> Result<()> {
        let mut documents = self.documents.write().await;
        let index = documents
            .iter()
            .position(|d| d.id == id)
            .ok_or_else(|| Error::NotFound(format!("Document {} not found", id)))?;
        let removed = documents.remove(index);

        info!(
            subsystem = "db",
            component = "memory",
            op = "delete",
            doc_id = %id,
            filename = %removed.filename,
            doc_count = documents.len(),
            "Document deleted"
        );
        Ok(())
    }
}
