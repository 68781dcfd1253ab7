//! Cohere embedding backend.
//!
//! Cohere v3 embedding models are asymmetric: documents and queries are
//! embedded with different `input_type` values, and mixing them degrades
//! ranking. `embed_texts` uses `search_document`; `embed_query` uses
//! `search_query`.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};
use tracing::{debug, info, instrument, warn};

use docseek_core::config::{env_or, env_string};
use docseek_core::{defaults, EmbeddingBackend, Error, Result, Vector};

use crate::provider::check_embeddings;

/// Default Cohere API endpoint.
pub const DEFAULT_COHERE_URL: &str = defaults::COHERE_URL;

/// Default embedding model.
pub const DEFAULT_EMBED_MODEL: &str = defaults::COHERE_EMBED_MODEL;

/// Output dimension of embed-english-v3.0.
pub const DEFAULT_DIMENSION: usize = defaults::COHERE_EMBED_DIMENSION;

/// Cohere `input_type` for a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum InputType {
    SearchDocument,
    SearchQuery,
}

/// Cohere embedding backend.
pub struct CohereBackend {
    client: Client,
    base_url: String,
    api_key: String,
    embed_model: String,
    dimension: usize,
    embed_timeout: Duration,
}

impl CohereBackend {
    /// Create a backend against the public API with default model settings.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self::with_config(
            DEFAULT_COHERE_URL.to_string(),
            api_key.into(),
            DEFAULT_EMBED_MODEL.to_string(),
            DEFAULT_DIMENSION,
        )
    }

    /// Create a new Cohere backend with custom configuration.
    pub fn with_config(
        base_url: String,
        api_key: String,
        embed_model: String,
        dimension: usize,
    ) -> Self {
        info!(
            subsystem = "inference",
            component = "cohere",
            url = %base_url,
            model = %embed_model,
            dimension,
            "Initializing Cohere backend"
        );

        Self {
            client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
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
    /// `COHERE_API_KEY` is required. `COHERE_BASE_URL`, `COHERE_EMBED_MODEL`,
    /// `COHERE_EMBED_DIM` and `DOCSEEK_EMBED_TIMEOUT_SECS` are optional.
    pub fn from_env() -> Result<Self> {
        let api_key = std::env::var("COHERE_API_KEY")
            .ok()
            .filter(|k| !k.trim().is_empty())
            .ok_or_else(|| Error::Config("COHERE_API_KEY is not set".to_string()))?;
        let base_url = env_string("COHERE_BASE_URL", DEFAULT_COHERE_URL);
        let embed_model = env_string("COHERE_EMBED_MODEL", DEFAULT_EMBED_MODEL);
        let dimension = env_or("COHERE_EMBED_DIM", DEFAULT_DIMENSION)?;
        let timeout_secs = env_or("DOCSEEK_EMBED_TIMEOUT_SECS", defaults::EMBED_TIMEOUT_SECS)?;

        Ok(Self::with_config(base_url, api_key, embed_model, dimension)
            .with_timeout(Duration::from_secs(timeout_secs)))
    }

    /// Embed `texts` with an explicit input type.
    #[instrument(skip(self, texts, input_type), fields(subsystem = "inference", component = "cohere", op = "embed", model = %self.embed_model, input_count = texts.len(), input_type = ?input_type))]
    pub async fn embed_with_input_type(
        &self,
        texts: &[String],
        input_type: InputType,
    ) -> Result<Vec<Vector>> {
        if texts.is_empty() {
            return Ok(vec![]);
        }

        let start = Instant::now();

        let request = EmbedRequest {
            model: &self.embed_model,
            texts,
            input_type,
        };

        let response = self
            .client
            .post(format!("{}/v1/embed", self.base_url))
            .bearer_auth(&self.api_key)
            .timeout(self.embed_timeout)
            .json(&request)
            .send()
            .await
            .map_err(|e| Error::Embedding(format!("Request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Embedding(format!(
                "Cohere returned {}: {}",
                status, body
            )));
        }

        let result: EmbedResponse = response
            .json()
            .await
            .map_err(|e| Error::Embedding(format!("Failed to parse response: {}", e)))?;

        let vectors = check_embeddings("Cohere", texts.len(), result.embeddings)?;
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
}

#[derive(Serialize)]
struct EmbedRequest<'a> {
    model: &'a str,
    texts: &'a [String],
    input_type: InputType,
}

#[derive(Deserialize)]
struct EmbedResponse {
    embeddings: Vec<Vec<f32>>,
}

#[async_trait]
impl EmbeddingBackend for CohereBackend {
    async fn embed_texts(&self, texts: &[String]) -> Result<Vec<Vector>> {
        self.embed_with_input_type(texts, InputType::SearchDocument)
            .await
    }

    async fn embed_query(&self, query: &str) -> Result<Vector> {
        self.embed_with_input_type(&[query.to_string()], InputType::SearchQuery)
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| Error::Embedding("Cohere returned no embedding".to_string()))
    }

    fn dimension(&self) -> usize {
        self.dimension
    }

    fn model_name(&self) -> &str {
        &self.embed_model
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_constants() {
        assert_eq!(DEFAULT_COHERE_URL, "https://api.cohere.com");
        assert_eq!(DEFAULT_EMBED_MODEL, "embed-english-v3.0");
        assert_eq!(DEFAULT_DIMENSION, 1024);
    }

    #[test]
    fn test_new_uses_defaults() {
        let backend = CohereBackend::new("key");
        assert_eq!(backend.base_url, DEFAULT_COHERE_URL);
        assert_eq!(backend.model_name(), DEFAULT_EMBED_MODEL);
        assert_eq!(backend.dimension(), 1024);
    }

    #[test]
    fn test_request_serialization() {
        let texts = vec!["hello".to_string()];
        let request = EmbedRequest {
            model: "embed-english-v3.0",
            texts: &texts,
            input_type: InputType::SearchQuery,
        };
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["model"], "embed-english-v3.0");
        assert_eq!(json["texts"][0], "hello");
        assert_eq!(json["input_type"], "search_query");
    }

    #[test]
    fn test_input_type_document_serialization() {
        let json = serde_json::to_string(&InputType::SearchDocument).unwrap();
        assert_eq!(json, "\"search_document\"");
    }

    #[test]
    fn test_response_ignores_extra_fields() {
        let json = r#"{"id": "abc", "texts": ["a"], "embeddings": [[0.1, 0.2]], "meta": {}}"#;
        let response: EmbedResponse = serde_json::from_str(json).unwrap();
        assert_eq!(response.embeddings, vec![vec![0.1, 0.2]]);
    }
}
