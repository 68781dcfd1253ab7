//! Search orchestration.
//!
//! A search validates the query, reads a snapshot of the repository, then
//! either matches literally or embeds the query and ranks by similarity.
//! Excerpts are built only for documents that survive ranking.

use std::sync::Arc;
use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument, warn};

use docseek_core::config::{env_flag, env_or, env_parse};
use docseek_core::defaults::{self, MSG_NO_DOCUMENTS, MSG_NO_MATCHES, MSG_NO_SIMILAR};
use docseek_core::{
    Document, DocumentRepository, EmbeddingBackend, Error, Result, RetrievedChunk, SearchMode,
    SearchResponse, SearchResult, Vector,
};

use crate::excerpt::QueryMatcher;
use crate::ingest::EmbeddedChunk;
use crate::similarity::{rank_chunks, rank_with_exclusions, Candidate};

/// Configuration for document search.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchConfig {
    /// Mode used by [`SearchEngine::search`].
    pub mode: SearchMode,
    /// Minimum cosine similarity for semantic results.
    pub similarity_threshold: f32,
    /// Upper bound on the query embedding call.
    pub embed_timeout: Duration,
    /// Literal filtering is case-sensitive; counts and highlights never are.
    pub literal_case_sensitive: bool,
    /// Maximum number of results; `None` returns every match.
    pub limit: Option<usize>,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            mode: SearchMode::default(),
            similarity_threshold: defaults::SIMILARITY_THRESHOLD,
            embed_timeout: Duration::from_secs(defaults::EMBED_TIMEOUT_SECS),
            literal_case_sensitive: true,
            limit: None,
        }
    }
}

impl SearchConfig {
    /// Load from `DOCSEEK_SEARCH_MODE`, `DOCSEEK_SIMILARITY_THRESHOLD`,
    /// `DOCSEEK_EMBED_TIMEOUT_SECS`, `DOCSEEK_LITERAL_CASE_SENSITIVE` and
    /// `DOCSEEK_RESULT_LIMIT`.
    pub fn from_env() -> Result<Self> {
        let config = Self {
            mode: env_or("DOCSEEK_SEARCH_MODE", SearchMode::default())?,
            similarity_threshold: env_or(
                "DOCSEEK_SIMILARITY_THRESHOLD",
                defaults::SIMILARITY_THRESHOLD,
            )?,
            embed_timeout: Duration::from_secs(env_or(
                "DOCSEEK_EMBED_TIMEOUT_SECS",
                defaults::EMBED_TIMEOUT_SECS,
            )?),
            literal_case_sensitive: env_flag("DOCSEEK_LITERAL_CASE_SENSITIVE", true)?,
            limit: env_parse("DOCSEEK_RESULT_LIMIT")?,
        };
        config.validate()?;
        Ok(config)
    }

    /// Literal-only search.
    pub fn literal() -> Self {
        Self {
            mode: SearchMode::Literal,
            ..Default::default()
        }
    }

    pub fn with_mode(mut self, mode: SearchMode) -> Self {
        self.mode = mode;
        self
    }

    /// Set minimum similarity threshold.
    pub fn with_threshold(mut self, threshold: f32) -> Self {
        self.similarity_threshold = threshold;
        self
    }

    pub fn with_embed_timeout(mut self, timeout: Duration) -> Self {
        self.embed_timeout = timeout;
        self
    }

    pub fn with_literal_case_sensitive(mut self, case_sensitive: bool) -> Self {
        self.literal_case_sensitive = case_sensitive;
        self
    }

    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn validate(&self) -> Result<()> {
        if !(-1.0..=1.0).contains(&self.similarity_threshold) {
            return Err(Error::Config(format!(
                "similarity_threshold must be within [-1, 1], got {}",
                self.similarity_threshold
            )));
        }
        if self.embed_timeout.is_zero() {
            return Err(Error::Config("embed_timeout must be non-zero".to_string()));
        }
        if self.limit == Some(0) {
            return Err(Error::Config("limit must be at least 1".to_string()));
        }
        Ok(())
    }
}

/// Document search over an injected repository and embedding backend.
pub struct SearchEngine {
    repository: Arc<dyn DocumentRepository>,
    embedder: Arc<dyn EmbeddingBackend>,
    config: SearchConfig,
}

impl SearchEngine {
    pub fn new(
        repository: Arc<dyn DocumentRepository>,
        embedder: Arc<dyn EmbeddingBackend>,
    ) -> Self {
        Self {
            repository,
            embedder,
            config: SearchConfig::default(),
        }
    }

    /// Replace the configuration. Not validated here; see
    /// [`SearchConfig::validate`].
    pub fn with_config(mut self, config: SearchConfig) -> Self {
        self.config = config;
        self
    }

    pub fn config(&self) -> &SearchConfig {
        &self.config
    }

    /// Search using the configured mode.
    pub async fn search(&self, query: &str) -> Result<SearchResponse> {
        self.search_with_mode(query, self.config.mode).await
    }

    /// Search documents with an explicit mode.
    #[instrument(skip(self, query, mode), fields(subsystem = "search", component = "engine", op = "search", mode = %mode, query_len = query.len()))]
    pub async fn search_with_mode(&self, query: &str, mode: SearchMode) -> Result<SearchResponse> {
        let start = Instant::now();

        if query.trim().is_empty() {
            debug!("Rejecting blank query");
            return Err(Error::MissingQuery);
        }

        let documents = self.repository.list().await.map_err(|e| match e {
            Error::Repository(_) => e,
            other => Error::Repository(other.to_string()),
        })?;

        if documents.is_empty() {
            info!(result_count = 0, "No documents to search");
            return Ok(SearchResponse::empty(MSG_NO_DOCUMENTS));
        }

        let matcher = QueryMatcher::new(query)?;
        let response = match mode {
            SearchMode::Literal => self.literal_search(query, &matcher, &documents),
            SearchMode::Semantic => self.semantic_search(query, &matcher, &documents).await?,
        };

        info!(
            doc_count = documents.len(),
            result_count = response.results.len(),
            duration_ms = start.elapsed().as_millis() as u64,
            "Search complete"
        );
        Ok(response)
    }

    fn literal_search(
        &self,
        query: &str,
        matcher: &QueryMatcher,
        documents: &[Document],
    ) -> SearchResponse {
        let results: Vec<SearchResult> = documents
            .iter()
            .filter(|doc| {
                if self.config.literal_case_sensitive {
                    doc.text.contains(query)
                } else {
                    matcher.is_match(&doc.text)
                }
            })
            .take(self.limit())
            .map(|doc| SearchResult {
                filename: doc.filename.clone(),
                excerpt: matcher.create_excerpt(&doc.text),
                matches: matcher.count_matches(&doc.text),
                similarity: None,
            })
            .collect();

        debug!(
            result_count = results.len(),
            case_sensitive = self.config.literal_case_sensitive,
            "Literal match complete"
        );
        SearchResponse::new(results, MSG_NO_MATCHES)
    }

    async fn semantic_search(
        &self,
        query: &str,
        matcher: &QueryMatcher,
        documents: &[Document],
    ) -> Result<SearchResponse> {
        let query_vector = self.embed_query(query).await?;

        let candidates = documents
            .iter()
            .map(|doc| Candidate::new(doc, doc.embedding.as_deref()));
        let ranking = rank_with_exclusions(
            &query_vector,
            candidates,
            self.config.similarity_threshold,
        );

        for excluded in &ranking.excluded {
            warn!(
                doc_id = %excluded.item.id,
                filename = %excluded.item.filename,
                reason = %excluded.reason,
                "Document excluded from semantic ranking"
            );
        }

        let results: Vec<SearchResult> = ranking
            .ranked
            .into_iter()
            .take(self.limit())
            .map(|ranked| SearchResult {
                filename: ranked.item.filename.clone(),
                excerpt: matcher.create_excerpt(&ranked.item.text),
                matches: matcher.count_matches(&ranked.item.text),
                similarity: Some(ranked.similarity),
            })
            .collect();

        debug!(
            result_count = results.len(),
            excluded = ranking.excluded.len(),
            below_threshold = ranking.below_threshold,
            threshold = self.config.similarity_threshold,
            "Semantic ranking complete"
        );
        Ok(SearchResponse::new(results, MSG_NO_SIMILAR))
    }

    /// Rank pre-embedded chunks against `query`.
    ///
    /// `limit` overrides the configured limit.
    #[instrument(skip(self, query, chunks), fields(subsystem = "search", component = "engine", op = "search_chunks", query_len = query.len(), chunk_count = chunks.len()))]
    pub async fn search_chunks(
        &self,
        query: &str,
        chunks: &[EmbeddedChunk],
        limit: Option<usize>,
    ) -> Result<Vec<RetrievedChunk>> {
        let start = Instant::now();

        if query.trim().is_empty() {
            return Err(Error::MissingQuery);
        }
        if chunks.is_empty() {
            debug!("No chunks to search");
            return Ok(Vec::new());
        }

        let query_vector = self.embed_query(query).await?;
        let results = rank_chunks(
            &query_vector,
            chunks,
            self.config.similarity_threshold,
            limit.or(self.config.limit),
        );

        info!(
            result_count = results.len(),
            duration_ms = start.elapsed().as_millis() as u64,
            "Chunk search complete"
        );
        Ok(results)
    }

    /// Embed the query within the configured timeout.
    ///
    /// Every failure surfaces as `Error::Embedding`; there is no literal
    /// fallback.
    async fn embed_query(&self, query: &str) -> Result<Vector> {
        let start = Instant::now();
        let timeout = self.config.embed_timeout;

        let vector = match tokio::time::timeout(timeout, self.embedder.embed_query(query)).await {
            Ok(Ok(vector)) => vector,
            Ok(Err(Error::Embedding(msg))) => return Err(Error::Embedding(msg)),
            Ok(Err(other)) => return Err(Error::Embedding(other.to_string())),
            Err(_) => {
                warn!(
                    timeout_ms = timeout.as_millis() as u64,
                    model = self.embedder.model_name(),
                    "Query embedding timed out"
                );
                return Err(Error::Embedding(format!(
                    "Query embedding timed out after {:?}",
                    timeout
                )));
            }
        };

        if vector.is_empty() {
            return Err(Error::Embedding("Query embedding is empty".to_string()));
        }
        if vector.iter().any(|x| !x.is_finite()) {
            return Err(Error::Embedding(
                "Query embedding contains non-finite values".to_string(),
            ));
        }

        debug!(
            dimension = vector.len(),
            duration_ms = start.elapsed().as_millis() as u64,
            "Query embedded"
        );
        Ok(vector)
    }

    fn limit(&self) -> usize {
        self.config.limit.unwrap_or(usize::MAX)
    }
}
