//! Ollama embedding backend.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};
use tracing::{debug, info, instrument, warn};

use docseek_core::config::{env_or, env_string};
use docseek_core::{defaults, EmbeddingBackend, Error, Result, Vector};

use crate::provider::check_embeddings;

/// Default Ollama endpoint.
pub const DEFAULT_OLLAMA_URL: &str = defaults::OLLAMA_URL;

/// Default embedding model.
pub const DEFAULT_EMBED_MODEL: &str = defaults::EMBED_MODEL;

/// Default embedding dimension for nomic-embed-text.
pub const DEFAULT_DIMENSION: usize = defaults::EMBED_DIMENSION;

/// Ollama embedding backend.
pub struct OllamaBackend {
    client: Client,
    base_url: String,
    embed_model: String,
    dimension: usize,
    embed_timeout: Duration,
}

impl OllamaBackend {
    /// Create a new Ollama backend with default settings.
    pub fn new() -> Self {
        Self::with_config(
            DEFAULT_OLLAMA_URL.to_string(),
            DEFAULT_EMBED_MODEL.to_string(),
            DEFAULT_DIMENSION,
        )
    }

    /// Create a new Ollama backend with custom configuration.
    pub fn with_config(base_url: String, embed_model: String, dimension: usize) -> Self {
        info!(
            subsystem = "inference",
            component = "ollama",
            url = %base_url,
            model = %embed_model,
            dimension,
            "Initializing Ollama backend"
        );

        Self {
            client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            embed_model,
            dimension,
            embed_timeout: Duration::from_secs(defaults::EMBED_TIMEOUT_SECS),
        }
    }

    /// Override the per-request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.embed_timeout = timeout;
        self
    }

    /// Create from environment variables.
    ///
    /// Reads `OLLAMA_BASE`, `OLLAMA_EMBED_MODEL`, `OLLAMA_EMBED_DIM` and
    /// `DOCSEEK_EMBED_TIMEOUT_SECS`.
    pub fn from_env() -> Result<Self> {
        let base_url = env_string("OLLAMA_BASE", DEFAULT_OLLAMA_URL);
        let embed_model = env_string("OLLAMA_EMBED_MODEL", DEFAULT_EMBED_MODEL);
        let dimension = env_or("OLLAMA_EMBED_DIM", DEFAULT_DIMENSION)?;
        let timeout_secs = env_or("DOCSEEK_EMBED_TIMEOUT_SECS", defaults::EMBED_TIMEOUT_SECS)?;

        Ok(Self::with_config(base_url, embed_model, dimension)
            .with_timeout(Duration::from_secs(timeout_secs)))
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

impl Default for OllamaBackend {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Serialize)]
struct EmbeddingRequest {
    model: String,
    input: Vec<String>,
}

#[derive(Deserialize)]
struct EmbeddingResponse {
    embeddings: Vec<Vec<f32>>,
}

#[async_trait]
impl EmbeddingBackend for OllamaBackend {
    #[instrument(skip(self, texts), fields(subsystem = "inference", component = "ollama", op = "embed_texts", model = %self.embed_model, input_count = texts.len()))]
    async fn embed_texts(&self, texts: &[String]) -> Result<Vec<Vector>> {
        if texts.is_empty() {
            return Ok(vec![]);
        }

        let start = Instant::now();

        let request = EmbeddingRequest {
            model: self.embed_model.clone(),
            input: texts.to_vec(),
        };

        let response = self
            .client
            .post(format!("{}/api/embed", self.base_url))
            .timeout(self.embed_timeout)
            .json(&request)
            .send()
            .await
            .map_err(|e| Error::Embedding(format!("Request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Embedding(format!(
                "Ollama returned {}: {}",
                status, body
            )));
        }

        let result: EmbeddingResponse = response
            .json()
            .await
            .map_err(|e| Error::Embedding(format!("Failed to parse response: {}", e)))?;

        let vectors = check_embeddings("Ollama", texts.len(), result.embeddings)?;
        let elapsed = start.elapsed().as_millis() as u64;

        debug!(
            result_count = vectors.len(),
            duration_ms = elapsed,
            "Embedding complete"
        );
        if elapsed > defaults::SLOW_EMBED_MS {
            warn!(
                duration_ms = elapsed,
                input_count = texts.len(),
                slow = true,
                "Slow embedding operation"
            );
        }
        Ok(vectors)
    }

    fn dimension(&self) -> usize {
        self.dimension
    }

    fn model_name(&self) -> &str {
        &self.embed_model
    }
}
