//! Centralized default constants for docseek.
//!
//! **This module is the single source of truth** for shared default values.
//! Crates reference these constants instead of defining their own magic
//! numbers. Organized by domain area.

// =============================================================================
// CHUNKING
// =============================================================================

/// Target chunk size in estimated tokens.
pub const CHUNK_SIZE: usize = 512;

/// Overlap between adjacent chunks in estimated tokens.
pub const CHUNK_OVERLAP: usize = 128;

/// Chunks estimated below this many tokens are dropped.
pub const CHUNK_MIN_SIZE: usize = 50;

/// Characters per token used by the token estimator.
pub const CHARS_PER_TOKEN: usize = 4;

// =============================================================================
// SIMILARITY
// =============================================================================

/// Minimum cosine similarity for a document to appear in semantic results.
pub const SIMILARITY_THRESHOLD: f32 = 0.25;

// =============================================================================
// EXCERPT
// =============================================================================

/// Characters of context kept on each side of the first match.
pub const EXCERPT_CONTEXT_CHARS: usize = 50;

/// Characters shown when the query does not occur in the text.
pub const EXCERPT_FALLBACK_CHARS: usize = 200;

/// Marker appended/prepended when an excerpt is truncated.
pub const ELLIPSIS: &str = "...";

/// Opening highlight tag.
pub const MARK_OPEN: &str = "<mark>";

/// Closing highlight tag.
pub const MARK_CLOSE: &str = "</mark>";

// =============================================================================
// SEARCH RESPONSE MESSAGES
// =============================================================================

/// Message returned when the repository holds no documents.
pub const MSG_NO_DOCUMENTS: &str = "No documents available to search";

/// Message returned when a literal search finds nothing.
pub const MSG_NO_MATCHES: &str = "No matches found for query.";

/// Message returned when no document clears the similarity threshold.
pub const MSG_NO_SIMILAR: &str = "No sufficiently similar documents found for query.";

// =============================================================================
// INGESTION
// =============================================================================

/// Maximum accepted upload size in bytes (10 MiB).
pub const MAX_UPLOAD_BYTES: u64 = 10 * 1024 * 1024;

// =============================================================================
// INFERENCE
// =============================================================================

/// Default Ollama base URL.
pub const OLLAMA_URL: &str = "http://127.0.0.1:11434";

/// Default embedding model name (Ollama).
pub const EMBED_MODEL: &str = "nomic-embed-text";

/// Default embedding vector dimension for nomic-embed-text.
pub const EMBED_DIMENSION: usize = 768;

/// Default Cohere API base URL.
pub const COHERE_URL: &str = "https://api.cohere.com";

/// Default Cohere embedding model.
pub const COHERE_EMBED_MODEL: &str = "embed-english-v3.0";

/// Embedding dimension of embed-english-v3.0.
pub const COHERE_EMBED_DIMENSION: usize = 1024;

/// Timeout for embedding requests in seconds.
pub const EMBED_TIMEOUT_SECS: u64 = 30;

/// Embedding calls slower than this are logged as slow.
pub const SLOW_EMBED_MS: u64 = 5000;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    #[allow(clippy::assertions_on_constants)]
    fn test_chunking_defaults_consistent() {
        assert!(CHUNK_MIN_SIZE < CHUNK_SIZE);
        assert!(CHUNK_OVERLAP < CHUNK_SIZE);
        assert!(CHARS_PER_TOKEN > 0);
    }

    #[test]
    fn test_similarity_threshold_in_range() {
        assert!((-1.0..=1.0).contains(&SIMILARITY_THRESHOLD));
        assert!(SIMILARITY_THRESHOLD > 0.0);
    }

    #[test]
    #[allow(clippy::assertions_on_constants)]
    fn test_excerpt_defaults() {
        assert!(EXCERPT_FALLBACK_CHARS > EXCERPT_CONTEXT_CHARS);
        assert_eq!(ELLIPSIS.len(), 3);
    }
}
