//! Embedding provider selection and response validation.
//!
//! `backend_from_env` resolves `DOCSEEK_EMBED_PROVIDER` to a concrete
//! backend. Providers whose feature is not compiled in are a configuration
//! error, not a silent fallback.

use std::sync::Arc;

use tracing::info;

use docseek_core::config::env_string;
use docseek_core::{EmbeddingBackend, EmbeddingProvider, Error, Result, Vector};

/// Validate a provider's batch response against its request.
///
/// The response must hold exactly one non-empty, finite vector per input.
pub fn check_embeddings(
    provider: &str,
    expected: usize,
    vectors: Vec<Vec<f32>>,
) -> Result<Vec<Vector>> {
    if vectors.len() != expected {
        return Err(Error::Embedding(format!(
            "{} returned {} embeddings for {} inputs",
            provider,
            vectors.len(),
            expected
        )));
    }
    if let Some(i) = vectors.iter().position(|v| v.is_empty()) {
        return Err(Error::Embedding(format!(
            "{} returned an empty embedding at index {}",
            provider, i
        )));
    }
    if let Some(i) = vectors
        .iter()
        .position(|v| v.iter().any(|x| !x.is_finite()))
    {
        return Err(Error::Embedding(format!(
            "{} returned a non-finite embedding at index {}",
            provider, i
        )));
    }
    Ok(vectors)
}

/// Provider named by `DOCSEEK_EMBED_PROVIDER` (default `ollama`).
pub fn provider_from_env() -> Result<EmbeddingProvider> {
    let raw = env_string("DOCSEEK_EMBED_PROVIDER", "ollama");
    raw.parse()
        .map_err(|e: String| Error::Config(format!("DOCSEEK_EMBED_PROVIDER: {}", e)))
}

/// Build the embedding backend selected by the environment.
pub fn backend_from_env() -> Result<Arc<dyn EmbeddingBackend>> {
    let provider = provider_from_env()?;
    let backend = backend_for(provider)?;
    info!(
        subsystem = "inference",
        component = "provider",
        provider = %provider,
        model = backend.model_name(),
        dimension = backend.dimension(),
        "Embedding backend selected"
    );
    Ok(backend)
}

fn backend_for(provider: EmbeddingProvider) -> Result<Arc<dyn EmbeddingBackend>> {
    match provider {
        #[cfg(feature = "ollama")]
        EmbeddingProvider::Ollama => Ok(Arc::new(crate::OllamaBackend::from_env()?)),
        #[cfg(feature = "cohere")]
        EmbeddingProvider::Cohere => Ok(Arc::new(crate::CohereBackend::from_env()?)),
        #[cfg(feature = "mock")]
        EmbeddingProvider::Mock => Ok(Arc::new(crate::MockEmbeddingBackend::new())),
        #[allow(unreachable_patterns)]
        other => Err(Error::Config(format!(
            "Embedding provider '{}' is not compiled in (enable the `{}` feature)",
            other, other
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_check_embeddings_accepts_matching_batch() {
        let vectors = check_embeddings("test", 2, vec![vec![1.0], vec![0.5]]).unwrap();
        assert_eq!(vectors.len(), 2);
    }

    #[test]
    fn test_check_embeddings_count_mismatch() {
        let err = check_embeddings("test", 2, vec![vec![1.0]]).unwrap_err();
        assert!(matches!(err, Error::Embedding(_)));
        assert!(err.to_string().contains("1 embeddings for 2 inputs"));
    }

    #[test]
    fn test_check_embeddings_empty_vector() {
        let err = check_embeddings("test", 1, vec![vec![]]).unwrap_err();
        assert!(err.to_string().contains("empty embedding"));
    }

    #[test]
    fn test_check_embeddings_non_finite() {
        let err = check_embeddings("test", 1, vec![vec![1.0, f32::NAN]]).unwrap_err();
        assert!(err.to_string().contains("non-finite"));
    }

    // Provider env handling is covered in tests/provider_test.rs, which runs
    // in its own process so env mutation cannot race these tests.
}
