//! # docseek-search
//!
//! Retrieval for docseek: similarity ranking, excerpt building, the search
//! orchestrator, and the ingestion pipeline that feeds it.
//!
//! ## Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use docseek_db::InMemoryDocumentRepository;
//! use docseek_inference::backend_from_env;
//! use docseek_search::{SearchConfig, SearchEngine};
//!
//! let engine = SearchEngine::new(Arc::new(InMemoryDocumentRepository::new()), backend_from_env()?)
//!     .with_config(SearchConfig::from_env()?);
//! let response = engine.search("quarterly revenue").await?;
//! for result in response.results {
//!     println!("{} ({:?}): {}", result.filename, result.similarity, result.excerpt);
//! }
//! ```

pub mod engine;
pub mod excerpt;
pub mod ingest;
pub mod similarity;

pub use engine::{SearchConfig, SearchEngine};
pub use excerpt::{count_matches, create_excerpt, escape_regex, highlight, QueryMatcher};
pub use ingest::{DocumentIngestor, EmbeddedChunk, IngestConfig, PlainTextExtractor};
pub use similarity::{
    compare, cosine_similarity, rank, rank_chunks, rank_with_exclusions, Candidate, Excluded,
    Incomparable, Ranked, Ranking,
};
