//! Document ingestion: validate, extract, embed, store.
//!
//! Chunking runs here rather than at query time. Chunks and their
//! embeddings are returned to the caller and never persisted.

use std::sync::Arc;
use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

use docseek_core::config::{env_flag, env_or};
use docseek_core::{
    defaults, file_extension, parse_id, sanitize_filename, validate_upload, Document,
    DocumentRepository, EmbeddingBackend, Error, NewDocument, Result, TextExtractor, Upload,
    Vector,
};
use docseek_db::{Chunk, Chunker, ChunkingConfig, SentenceChunker};

/// A chunk of a stored document together with its embedding.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmbeddedChunk {
    pub doc_id: Uuid,
    pub filename: String,
    pub chunk_index: usize,
    pub chunk: Chunk,
    pub embedding: Vector,
}

// =============================================================================
// EXTRACTION
// =============================================================================

/// UTF-8 plain text extractor.
#[derive(Debug, Default, Clone, Copy)]
pub struct PlainTextExtractor;

impl TextExtractor for PlainTextExtractor {
    fn supports(&self, mime_type: &str) -> bool {
        // Accept parameters such as `; charset=utf-8`.
        mime_type
            .split(';')
            .next()
            .is_some_and(|essence| essence.trim().eq_ignore_ascii_case("text/plain"))
    }

    fn extensions(&self) -> &[&str] {
        &["txt"]
    }

    fn extract(&self, bytes: &[u8]) -> Result<String> {
        let text = std::str::from_utf8(bytes)
            .map_err(|e| Error::InvalidInput(format!("File is not valid UTF-8: {}", e)))?;
        Ok(text.strip_prefix('\u{feff}').unwrap_or(text).to_string())
    }

    fn name(&self) -> &str {
        "plain_text"
    }
}

// =============================================================================
// CONFIGURATION
// =============================================================================

/// Ingestion settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IngestConfig {
    pub max_upload_bytes: u64,
    pub chunking: ChunkingConfig,
    /// Store a whole-document embedding. When false, documents are stored
    /// without one and never appear in semantic results.
    pub embed_documents: bool,
    pub embed_timeout: Duration,
}

impl Default for IngestConfig {
    fn default() -> Self {
        Self {
            max_upload_bytes: defaults::MAX_UPLOAD_BYTES,
            chunking: ChunkingConfig::default(),
            embed_documents: true,
            embed_timeout: Duration::from_secs(defaults::EMBED_TIMEOUT_SECS),
        }
    }
}

impl IngestConfig {
    /// Load from `DOCSEEK_MAX_UPLOAD_BYTES`, `DOCSEEK_EMBED_DOCUMENTS`,
    /// `DOCSEEK_EMBED_TIMEOUT_SECS` and the chunking variables.
    pub fn from_env() -> Result<Self> {
        Ok(Self {
            max_upload_bytes: env_or("DOCSEEK_MAX_UPLOAD_BYTES", defaults::MAX_UPLOAD_BYTES)?,
            chunking: ChunkingConfig::from_env()?,
            embed_documents: env_flag("DOCSEEK_EMBED_DOCUMENTS", true)?,
            embed_timeout: Duration::from_secs(env_or(
                "DOCSEEK_EMBED_TIMEOUT_SECS",
                defaults::EMBED_TIMEOUT_SECS,
            )?),
        })
    }

    pub fn with_max_upload_bytes(mut self, max: u64) -> Self {
        self.max_upload_bytes = max;
        self
    }

    pub fn with_chunking(mut self, chunking: ChunkingConfig) -> Self {
        self.chunking = chunking;
        self
    }

    pub fn with_embed_documents(mut self, embed: bool) -> Self {
        self.embed_documents = embed;
        self
    }

    pub fn with_embed_timeout(mut self, timeout: Duration) -> Self {
        self.embed_timeout = timeout;
        self
    }
}

// =============================================================================
// INGESTOR
// =============================================================================

/// Turns uploads into stored documents.
pub struct DocumentIngestor {
    repository: Arc<dyn DocumentRepository>,
    embedder: Arc<dyn EmbeddingBackend>,
    extractors: Vec<Box<dyn TextExtractor>>,
    chunker: SentenceChunker,
    config: IngestConfig,
}

impl DocumentIngestor {
    /// Create an ingestor with default settings and the plain text extractor.
    pub fn new(
        repository: Arc<dyn DocumentRepository>,
        embedder: Arc<dyn EmbeddingBackend>,
    ) -> Self {
        Self::with_config(repository, embedder, IngestConfig::default())
    }

    pub fn with_config(
        repository: Arc<dyn DocumentRepository>,
        embedder: Arc<dyn EmbeddingBackend>,
        config: IngestConfig,
    ) -> Self {
        Self {
            repository,
            embedder,
            extractors: vec![Box::new(PlainTextExtractor)],
            chunker: SentenceChunker::new(config.chunking),
            config,
        }
    }

    /// Register an additional extractor. Earlier registrations win on ties.
    pub fn with_extractor(mut self, extractor: Box<dyn TextExtractor>) -> Self {
        self.extractors.push(extractor);
        self
    }

    pub fn config(&self) -> &IngestConfig {
        &self.config
    }

    /// Extensions accepted by at least one registered extractor.
    pub fn allowed_extensions(&self) -> Vec<&str> {
        let mut extensions: Vec<&str> = self
            .extractors
            .iter()
            .flat_map(|e| e.extensions().iter().copied())
            .collect();
        extensions.sort_unstable();
        extensions.dedup();
        extensions
    }

    /// Pick by MIME type first, then by extension.
    fn extractor_for(&self, mime_type: &str, extension: &str) -> Result<&dyn TextExtractor> {
        self.extractors
            .iter()
            .find(|e| e.supports(mime_type))
            .or_else(|| {
                self.extractors
                    .iter()
                    .find(|e| e.extensions().contains(&extension))
            })
            .map(|e| e.as_ref())
            .ok_or_else(|| {
                Error::UnsupportedFileType(format!("No extractor for MIME type '{}'", mime_type))
            })
    }

    /// Validate, extract, embed and store an upload.
    #[instrument(skip(self, upload), fields(subsystem = "ingest", component = "ingestor", op = "ingest", filename = %upload.filename, size_bytes = upload.bytes.len()))]
    pub async fn ingest(&self, upload: Upload) -> Result<Document> {
        let start = Instant::now();

        let allowed = self.allowed_extensions();
        validate_upload(
            &upload.filename,
            upload.bytes.len() as u64,
            &allowed,
            self.config.max_upload_bytes,
        )?;

        let extension = file_extension(upload.filename.trim());
        let extractor = self.extractor_for(&upload.mime_type, &extension)?;
        let text = extractor.extract(&upload.bytes)?;
        if text.trim().is_empty() {
            return Err(Error::InvalidInput(
                "Uploaded file contains no text".to_string(),
            ));
        }
        debug!(
            extractor = extractor.name(),
            text_len = text.len(),
            "Text extracted"
        );

        let mut new_doc = NewDocument::new(sanitize_filename(&upload.filename), text);
        if self.config.embed_documents {
            let embedding = self.embed_one(&new_doc.text).await?;
            new_doc = new_doc.with_embedding(embedding);
        }

        let document = self.repository.insert(new_doc).await?;

        info!(
            doc_id = %document.id,
            embedded = document.embedding.is_some(),
            duration_ms = start.elapsed().as_millis() as u64,
            "Document ingested"
        );
        Ok(document)
    }

    async fn embed_one(&self, text: &str) -> Result<Vector> {
        let embedding = tokio::time::timeout(self.config.embed_timeout, self.embedder.embed(text))
            .await
            .map_err(|_| {
                Error::Embedding(format!(
                    "Document embedding timed out after {:?}",
                    self.config.embed_timeout
                ))
            })??;
        if embedding.is_empty() {
            return Err(Error::Embedding("Embedding is empty".to_string()));
        }
        Ok(embedding)
    }

    /// Chunk a stored document and embed every chunk in one batch.
    #[instrument(skip(self, document), fields(subsystem = "ingest", component = "ingestor", op = "chunk_and_embed", doc_id = %document.id))]
    pub async fn chunk_and_embed(&self, document: &Document) -> Result<Vec<EmbeddedChunk>> {
        let chunks = self.chunker.chunk(&document.text);
        if chunks.is_empty() {
            debug!("Document produced no chunks");
            return Ok(Vec::new());
        }

        let texts: Vec<String> = chunks.iter().map(|c| c.text.clone()).collect();
        let embeddings = tokio::time::timeout(
            self.config.embed_timeout,
            self.embedder.embed_texts(&texts),
        )
        .await
        .map_err(|_| {
            Error::Embedding(format!(
                "Chunk embedding timed out after {:?}",
                self.config.embed_timeout
            ))
        })??;

        if embeddings.len() != chunks.len() {
            warn!(
                chunk_count = chunks.len(),
                embedding_count = embeddings.len(),
                "Embedding count mismatch"
            );
            return Err(Error::Embedding(format!(
                "Expected {} chunk embeddings, got {}",
                chunks.len(),
                embeddings.len()
            )));
        }

        let embedded: Vec<EmbeddedChunk> = chunks
            .into_iter()
            .zip(embeddings)
            .enumerate()
            .map(|(chunk_index, (chunk, embedding))| EmbeddedChunk {
                doc_id: document.id,
                filename: document.filename.clone(),
                chunk_index,
                chunk,
                embedding,
            })
            .collect();

        info!(chunk_count = embedded.len(), "Document chunked and embedded");
        Ok(embedded)
    }

    /// Every stored document.
    pub async fn list(&self) -> Result<Vec<Document>> {
        self.repository.list().await
    }

    /// Delete a document by its textual id.
    #[instrument(skip(self), fields(subsystem = "ingest", component = "ingestor", op = "delete"))]
    pub async fn delete(&self, id: &str) -> Result<()> {
        let id = parse_id(id)?;
        self.repository.delete(id).await?;
        info!(doc_id = %id, "Document deleted");
        Ok(())
    }
}
