//! Structured logging field name constants for docseek.
//!
//! All crates use these names for `tracing` fields so log aggregation can
//! query by the same keys across subsystems.
//!
//! ## Log Level Contract
//!
//! | Level | Usage |
//! |-------|-------|
//! | ERROR | Request failed, caller receives an error |
//! | WARN  | Recoverable issue (document excluded, slow embedding) |
//! | INFO  | Operation completions (search, ingest, delete) |
//! | DEBUG | Decision points, intermediate counts, config choices |
//! | TRACE | Per-item iteration (candidates, chunks) |

// ─── Identity fields ───────────────────────────────────────────────────────

/// Subsystem originating the log event.
/// Values: "search", "db", "inference", "ingest"
pub const SUBSYSTEM: &str = "subsystem";

/// Component within a subsystem.
/// Examples: "ranker", "engine", "ingestor", "memory", "ollama", "cohere"
pub const COMPONENT: &str = "component";

/// Logical operation name.
/// Examples: "search", "embed_texts", "ingest", "chunk"
pub const OPERATION: &str = "op";

// ─── Entity fields ─────────────────────────────────────────────────────────

/// Document UUID being operated on.
pub const DOC_ID: &str = "doc_id";

/// Document filename.
pub const FILENAME: &str = "filename";

/// Byte length of the search query (the query text itself is not logged).
pub const QUERY_LEN: &str = "query_len";

/// Search mode ("literal", "semantic").
pub const SEARCH_MODE: &str = "mode";

// ─── Measurement fields ────────────────────────────────────────────────────

/// Wall-clock duration in milliseconds.
pub const DURATION_MS: &str = "duration_ms";

/// Number of results returned by a search.
pub const RESULT_COUNT: &str = "result_count";

/// Number of documents scanned.
pub const DOC_COUNT: &str = "doc_count";

/// Number of chunks produced or ranked.
pub const CHUNK_COUNT: &str = "chunk_count";

/// Number of input texts sent to an embedding model.
pub const INPUT_COUNT: &str = "input_count";

/// Cosine similarity of a candidate.
pub const SIMILARITY: &str = "similarity";

/// Threshold applied to similarity scores.
pub const THRESHOLD: &str = "threshold";

// ─── Inference fields ──────────────────────────────────────────────────────

/// Model name used for embeddings.
pub const MODEL: &str = "model";

// ─── Outcome fields ────────────────────────────────────────────────────────

/// Why a candidate was excluded.
pub const REASON: &str = "reason";

/// Error message when an operation fails.
pub const ERROR_MSG: &str = "error";

/// Slow operation threshold exceeded.
pub const SLOW: &str = "slow";
