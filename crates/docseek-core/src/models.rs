//! Domain models for docseek.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Dense embedding vector.
pub type Vector = Vec<f32>;

// =============================================================================
// DOCUMENT TYPES
// =============================================================================

/// A stored document. Owned by the repository; search only reads it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    pub id: Uuid,
    pub filename: String,
    pub text: String,
    /// Whole-document embedding; `None` when the document was stored without one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub embedding: Option<Vector>,
    pub uploaded_at: DateTime<Utc>,
}

/// Request for inserting a document. The repository assigns `id` and `uploaded_at`.
#[derive(Debug, Clone, PartialEq)]
pub struct NewDocument {
    pub filename: String,
    pub text: String,
    pub embedding: Option<Vector>,
}

impl NewDocument {
    pub fn new(filename: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            filename: filename.into(),
            text: text.into(),
            embedding: None,
        }
    }

    pub fn with_embedding(mut self, embedding: Vector) -> Self {
        self.embedding = Some(embedding);
        self
    }
}

/// A raw upload before text extraction.
#[derive(Debug, Clone)]
pub struct Upload {
    /// Original filename as supplied by the client.
    pub filename: String,
    /// Claimed MIME type.
    pub mime_type: String,
    pub bytes: Vec<u8>,
}

impl Upload {
    pub fn new(filename: impl Into<String>, mime_type: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            filename: filename.into(),
            mime_type: mime_type.into(),
            bytes,
        }
    }
}

// =============================================================================
// SEARCH TYPES
// =============================================================================

/// How a query is matched against documents.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SearchMode {
    /// Literal substring match, no embedding dependency.
    Literal,
    /// Embedding similarity ranking (default).
    #[default]
    Semantic,
}

impl std::fmt::Display for SearchMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Literal => write!(f, "literal"),
            Self::Semantic => write!(f, "semantic"),
        }
    }
}

impl std::str::FromStr for SearchMode {
    type Err = String;
    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "literal" | "text" => Ok(Self::Literal),
            "semantic" | "vector" => Ok(Self::Semantic),
            _ => Err(format!("Invalid search mode: {}", s)),
        }
    }
}

/// One document in a search response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchResult {
    pub filename: String,
    /// Context window around the first match, with `<mark>` highlighting.
    pub excerpt: String,
    /// Case-insensitive occurrence count of the query in the full text.
    pub matches: usize,
    /// Cosine similarity; present only for semantic results.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub similarity: Option<f32>,
}

/// Search response.
///
/// `message` is set only when `results` is empty, and tells "no documents
/// stored" apart from "nothing matched".
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchResponse {
    pub results: Vec<SearchResult>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl SearchResponse {
    /// Build a response, attaching `empty_message` only if `results` is empty.
    pub fn new(results: Vec<SearchResult>, empty_message: &str) -> Self {
        let message = results.is_empty().then(|| empty_message.to_string());
        Self { results, message }
    }

    /// Empty response with an explanatory message.
    pub fn empty(message: impl Into<String>) -> Self {
        Self {
            results: Vec::new(),
            message: Some(message.into()),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }
}

/// A chunk ranked against a query.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RetrievedChunk {
    pub doc_id: Uuid,
    pub filename: String,
    /// `"{doc_id}:{chunk_index}"`
    pub chunk_id: String,
    pub text: String,
    pub similarity: f32,
    pub start_offset: usize,
    pub end_offset: usize,
}

/// Build the identifier of the `index`-th chunk of a document.
pub fn chunk_id(doc_id: Uuid, index: usize) -> String {
    format!("{}:{}", doc_id, index)
}
