//! # docseek-core
//!
//! Core types, traits, and abstractions for the docseek retrieval pipeline.
//!
//! This crate provides the foundational data structures and trait definitions
//! that other docseek crates depend on.

pub mod config;
pub mod defaults;
pub mod embedding_provider;
pub mod error;
pub mod file_safety;
pub mod logging;
pub mod models;
pub mod tokenizer;
pub mod traits;
pub mod uuid_utils;

// Re-export commonly used types at crate root
pub use embedding_provider::EmbeddingProvider;
pub use error::{Error, Result};
pub use file_safety::{file_extension, sanitize_filename, validate_upload};
pub use models::*;
pub use tokenizer::*;
pub use traits::*;
pub use uuid_utils::{new_v7, parse_id};
