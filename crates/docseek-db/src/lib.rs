//! # docseek-db
//!
//! Document preparation and storage for docseek.
//!
//! This crate provides:
//! - Sentence splitting and overlapping, token-bounded chunking
//! - An in-memory `DocumentRepository` implementation
//!
//! ## Example
//!
//! ```rust,ignore
//! use docseek_core::{DocumentRepository, NewDocument};
//! use docseek_db::InMemoryDocumentRepository;
//!
//! #[tokio::main]
//! async fn main() -> docseek_core::Result<()> {
//!     let repo = InMemoryDocumentRepository::new();
//!     let doc = repo.insert(NewDocument::new("notes.txt", "Hello, world!")).await?;
//!     println!("Stored document: {}", doc.id);
//!     Ok(())
//! }
//! ```
pub mod chunking;
pub mod memory;

pub use chunking::{
    chunk_document, sentence_spans, split_into_sentences, Chunk, Chunker, ChunkingConfig,
    SentenceChunker,
};
pub use memory::InMemoryDocumentRepository;
