//! Sentence-aware document chunking for embedding generation.
//!
//! Documents are split into sentences, then sentences are packed greedily
//! into chunks bounded by an estimated token budget. Consecutive chunks
//! share trailing sentences of the previous chunk as overlap; a sentence is
//! never split.
//!
//! # Example
//!
//! ```rust
//! use docseek_db::chunking::{Chunker, ChunkingConfig, SentenceChunker};
//!
//! let chunker = SentenceChunker::new(ChunkingConfig::default());
//! let text = "Your text here.";
//!
//! for chunk in chunker.chunk(text) {
//!     assert_eq!(&text[chunk.start_offset..chunk.end_offset], chunk.text);
//! }
//! ```

use std::ops::Range;

use docseek_core::config::env_or;
use docseek_core::{defaults, estimate_tokens, Error, Result};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::trace;

/// One or more terminators followed by whitespace.
static SENTENCE_BOUNDARY: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[.!?]+\s+").expect("sentence boundary pattern is valid"));

/// Chunk sizing, in estimated tokens.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChunkingConfig {
    /// Upper bound a chunk grows to before it is emitted.
    pub chunk_size: usize,
    /// Token budget for sentences carried over into the next chunk.
    pub overlap_size: usize,
    /// Chunks estimated below this are dropped.
    pub min_chunk_size: usize,
}

impl Default for ChunkingConfig {
    fn default() -> Self {
        Self {
            chunk_size: defaults::CHUNK_SIZE,
            overlap_size: defaults::CHUNK_OVERLAP,
            min_chunk_size: defaults::CHUNK_MIN_SIZE,
        }
    }
}

impl ChunkingConfig {
    /// Load from `DOCSEEK_CHUNK_SIZE`, `DOCSEEK_CHUNK_OVERLAP` and
    /// `DOCSEEK_CHUNK_MIN_SIZE`, falling back to defaults.
    pub fn from_env() -> Result<Self> {
        let config = Self {
            chunk_size: env_or("DOCSEEK_CHUNK_SIZE", defaults::CHUNK_SIZE)?,
            overlap_size: env_or("DOCSEEK_CHUNK_OVERLAP", defaults::CHUNK_OVERLAP)?,
            min_chunk_size: env_or("DOCSEEK_CHUNK_MIN_SIZE", defaults::CHUNK_MIN_SIZE)?,
        };
        config.validate()?;
        Ok(config)
    }

    pub fn with_chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = chunk_size;
        self
    }

    pub fn with_overlap_size(mut self, overlap_size: usize) -> Self {
        self.overlap_size = overlap_size;
        self
    }

    pub fn with_min_chunk_size(mut self, min_chunk_size: usize) -> Self {
        self.min_chunk_size = min_chunk_size;
        self
    }

    /// Reject sizes that cannot make progress.
    pub fn validate(&self) -> Result<()> {
        if self.chunk_size == 0 {
            return Err(Error::Config("chunk_size must be greater than 0".to_string()));
        }
        if self.overlap_size >= self.chunk_size {
            return Err(Error::Config(format!(
                "overlap_size ({}) must be less than chunk_size ({})",
                self.overlap_size, self.chunk_size
            )));
        }
        Ok(())
    }
}

/// A contiguous slice of a source document.
///
/// Offsets are byte offsets and always satisfy
/// `source[start_offset..end_offset] == text`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Chunk {
    pub text: String,
    pub start_offset: usize,
    pub end_offset: usize,
}

impl Chunk {
    /// Build a chunk from a byte range, trimming surrounding whitespace and
    /// moving the offsets inward to match.
    fn from_range(source: &str, range: Range<usize>) -> Self {
        let raw = &source[range.clone()];
        let leading = raw.len() - raw.trim_start().len();
        let text = raw.trim();
        let start_offset = range.start + leading;
        Self {
            text: text.to_string(),
            start_offset,
            end_offset: start_offset + text.len(),
        }
    }

    /// Length of the chunk in bytes.
    pub fn len(&self) -> usize {
        self.text.len()
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    /// Estimated token count of the chunk text.
    pub fn tokens(&self) -> usize {
        estimate_tokens(&self.text)
    }
}

/// Common trait for chunking strategies.
pub trait Chunker: Send + Sync {
    /// Chunk the given text into a list of chunks.
    fn chunk(&self, text: &str) -> Vec<Chunk>;

    /// Get the configuration used by this chunker.
    fn config(&self) -> &ChunkingConfig;
}

/// Byte ranges of the sentences in `text`.
///
/// Each range includes its trailing terminator and whitespace. Pieces with
/// no content before their delimiter are dropped. If nothing remains the
/// whole input is returned as a single range, so the result is never empty.
pub fn sentence_spans(text: &str) -> Vec<Range<usize>> {
    let mut spans = Vec::new();
    let mut last_end = 0;

    for mat in SENTENCE_BOUNDARY.find_iter(text) {
        if !text[last_end..mat.start()].trim().is_empty() {
            spans.push(last_end..mat.end());
        }
        last_end = mat.end();
    }

    if !text[last_end..].trim().is_empty() {
        spans.push(last_end..text.len());
    }

    if spans.is_empty() {
        spans.push(0..text.len());
    }
    spans
}

/// Split text into sentence-like units, keeping terminal punctuation and the
/// whitespace that follows it attached to each sentence.
pub fn split_into_sentences(text: &str) -> Vec<&str> {
    sentence_spans(text)
        .into_iter()
        .map(|span| &text[span])
        .collect()
}

/// Chunk `text` into overlapping, token-bounded chunks.
///
/// Empty or whitespace-only input yields no chunks. Non-empty input yields
/// at least one: if every candidate fell below `min_chunk_size`, the whole
/// trimmed text is returned as a single chunk.
pub fn chunk_document(text: &str, config: &ChunkingConfig) -> Vec<Chunk> {
    if text.trim().is_empty() {
        return Vec::new();
    }

    let spans = sentence_spans(text);
    let tokens: Vec<usize> = spans.iter().map(|s| estimate_tokens(&text[s.clone()])).collect();

    let mut chunks = Vec::new();
    // Indices into `spans` of the sentences in the current buffer.
    let mut first = 0;
    let mut current_tokens = 0;

    for i in 0..spans.len() {
        if current_tokens + tokens[i] > config.chunk_size && i > first {
            emit(text, &spans[first..i], config, &mut chunks);

            let mut overlap_start = i;
            let mut overlap_tokens = 0;
            while overlap_start > first
                && overlap_tokens + tokens[overlap_start - 1] <= config.overlap_size
            {
                overlap_start -= 1;
                overlap_tokens += tokens[overlap_start];
            }

            first = overlap_start;
            current_tokens = overlap_tokens;
        }
        current_tokens += tokens[i];
    }

    emit(text, &spans[first..], config, &mut chunks);

    if chunks.is_empty() {
        chunks.push(Chunk::from_range(text, 0..text.len()));
    }
    chunks
}

/// Push the chunk covering `buffer` if it meets the minimum size.
fn emit(text: &str, buffer: &[Range<usize>], config: &ChunkingConfig, chunks: &mut Vec<Chunk>) {
    let (Some(head), Some(tail)) = (buffer.first(), buffer.last()) else {
        return;
    };
    let chunk = Chunk::from_range(text, head.start..tail.end);
    let tokens = chunk.tokens();
    if tokens >= config.min_chunk_size {
        chunks.push(chunk);
    } else {
        trace!(
            tokens,
            min_chunk_size = config.min_chunk_size,
            start_offset = chunk.start_offset,
            "Dropping undersized chunk"
        );
    }
}

/// Packs whole sentences into overlapping chunks.
#[derive(Debug, Clone, Default)]
pub struct SentenceChunker {
    config: ChunkingConfig,
}

impl SentenceChunker {
    /// Create a new SentenceChunker with the given configuration.
    pub fn new(config: ChunkingConfig) -> Self {
        Self { config }
    }
}

impl Chunker for SentenceChunker {
    fn chunk(&self, text: &str) -> Vec<Chunk> {
        chunk_document(text, &self.config)
    }

    fn config(&self) -> &ChunkingConfig {
        &self.config
    }
}
