//! # docseek-inference
//!
//! Embedding backends for docseek.
//!
//! This crate provides:
//! - Ollama implementation (default, feature `ollama`)
//! - Cohere implementation (feature `cohere`)
//! - Deterministic mock implementation (feature `mock`)
//! - Environment-driven backend selection
//!
//! # Example
//!
//! ```rust,no_run
//! use docseek_inference::OllamaBackend;
//! use docseek_core::EmbeddingBackend;
//!
//! #[tokio::main]
//! async fn main() {
//!     let backend = OllamaBackend::from_env().unwrap();
//!     let texts = vec!["Hello".to_string()];
//!     let embeddings = backend.embed_texts(&texts).await.unwrap();
//! }
//! ```

pub mod provider;

#[cfg(feature = "ollama")]
pub mod ollama;

#[cfg(feature = "cohere")]
pub mod cohere;

#[cfg(any(test, feature = "mock"))]
pub mod mock;

#[cfg(feature = "ollama")]
pub use ollama::OllamaBackend;

#[cfg(feature = "cohere")]
pub use cohere::CohereBackend;

#[cfg(any(test, feature = "mock"))]
pub use mock::{MockEmbeddingBackend, MockEmbeddingGenerator};

pub use provider::{backend_from_env, check_embeddings, provider_from_env};
