//! Mock embedding backend for deterministic testing.
//!
//! Generates reproducible vectors from text content, so the same text always
//! embeds to the same vector without a model server. Fixed vectors can be
//! pinned per input to control similarity exactly.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use docseek_core::EmbeddingBackend;
//! use docseek_inference::mock::MockEmbeddingBackend;
//!
//! #[tokio::test]
//! async fn test_with_mock_backend() {
//!     let backend = MockEmbeddingBackend::new()
//!         .with_dimension(3)
//!         .with_fixed_vector("cats", vec![1.0, 0.0, 0.0]);
//!
//!     let embedding = backend.embed("cats").await.unwrap();
//!     assert_eq!(embedding, vec![1.0, 0.0, 0.0]);
//! }
//! ```

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;

use docseek_core::{EmbeddingBackend, Error, Result, Vector};

/// Mock embedding backend for testing.
#[derive(Clone)]
pub struct MockEmbeddingBackend {
    config: Arc<MockConfig>,
    call_log: Arc<Mutex<Vec<MockCall>>>,
}

#[derive(Debug, Clone)]
struct MockConfig {
    dimension: usize,
    fixed_vectors: HashMap<String, Vector>,
    latency_ms: u64,
    failure_rate: f64,
}

/// One recorded backend call.
#[derive(Debug, Clone)]
pub struct MockCall {
    /// `"embed_texts"` or `"embed_query"`.
    pub operation: String,
    pub inputs: Vec<String>,
    pub timestamp: std::time::Instant,
}

impl Default for MockConfig {
    fn default() -> Self {
        Self {
            dimension: 384,
            fixed_vectors: HashMap::new(),
            latency_ms: 0,
            failure_rate: 0.0,
        }
    }
}

impl MockEmbeddingBackend {
    /// Create a new mock backend with default configuration.
    pub fn new() -> Self {
        Self {
            config: Arc::new(MockConfig::default()),
            call_log: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Set the dimension of generated embeddings.
    pub fn with_dimension(mut self, dimension: usize) -> Self {
        Arc::make_mut(&mut self.config).dimension = dimension;
        self
    }

    /// Return `vector` whenever `text` is embedded.
    ///
    /// The vector is returned as-is, so it may have any length; tests use
    /// this to produce dimension mismatches and zero vectors on purpose.
    pub fn with_fixed_vector(mut self, text: impl Into<String>, vector: Vector) -> Self {
        Arc::make_mut(&mut self.config)
            .fixed_vectors
            .insert(text.into(), vector);
        self
    }

    /// Set simulated latency for every call.
    pub fn with_latency_ms(mut self, latency_ms: u64) -> Self {
        Arc::make_mut(&mut self.config).latency_ms = latency_ms;
        self
    }

    /// Set failure rate (0.0 - 1.0) for testing error handling.
    pub fn with_failure_rate(mut self, rate: f64) -> Self {
        Arc::make_mut(&mut self.config).failure_rate = rate.clamp(0.0, 1.0);
        self
    }

    /// Fail every call.
    pub fn failing(self) -> Self {
        self.with_failure_rate(1.0)
    }

    /// Get all logged calls for assertion.
    pub fn get_calls(&self) -> Vec<MockCall> {
        self.lock_log().clone()
    }

    /// Clear the call log.
    pub fn clear_calls(&self) {
        self.lock_log().clear()
    }

    /// Number of calls of any kind.
    pub fn call_count(&self) -> usize {
        self.lock_log().len()
    }

    /// Number of query-side calls.
    pub fn query_call_count(&self) -> usize {
        self.lock_log()
            .iter()
            .filter(|c| c.operation == "embed_query")
            .count()
    }

    fn lock_log(&self) -> std::sync::MutexGuard<'_, Vec<MockCall>> {
        // A panic while holding the lock only happens inside a failing test.
        self.call_log
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn log_call(&self, operation: &str, inputs: Vec<String>) {
        self.lock_log().push(MockCall {
            operation: operation.to_string(),
            inputs,
            timestamp: std::time::Instant::now(),
        });
    }

    fn should_fail(&self) -> bool {
        use rand::Rng;
        if self.config.failure_rate >= 1.0 {
            true
        } else if self.config.failure_rate > 0.0 {
            rand::thread_rng().gen::<f64>() < self.config.failure_rate
        } else {
            false
        }
    }

    async fn simulate_latency(&self) {
        if self.config.latency_ms > 0 {
            tokio::time::sleep(Duration::from_millis(self.config.latency_ms)).await;
        }
    }

    fn vector_for(&self, text: &str) -> Vector {
        self.config
            .fixed_vectors
            .get(text)
            .cloned()
            .unwrap_or_else(|| MockEmbeddingGenerator::generate(text, self.config.dimension))
    }
}

impl Default for MockEmbeddingBackend {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl EmbeddingBackend for MockEmbeddingBackend {
    async fn embed_texts(&self, texts: &[String]) -> Result<Vec<Vector>> {
        self.log_call("embed_texts", texts.to_vec());
        self.simulate_latency().await;

        if self.should_fail() {
            return Err(Error::Embedding("Simulated failure for testing".to_string()));
        }
        Ok(texts.iter().map(|t| self.vector_for(t)).collect())
    }

    async fn embed_query(&self, query: &str) -> Result<Vector> {
        self.log_call("embed_query", vec![query.to_string()]);
        self.simulate_latency().await;

        if self.should_fail() {
            return Err(Error::Embedding("Simulated failure for testing".to_string()));
        }
        Ok(self.vector_for(query))
    }

    fn dimension(&self) -> usize {
        self.config.dimension
    }

    fn model_name(&self) -> &str {
        "mock-embed"
    }
}

/// Mock embedding generator with deterministic output.
pub struct MockEmbeddingGenerator;

impl MockEmbeddingGenerator {
    /// Generate a deterministic embedding from text.
    ///
    /// Uses character-based hashing for reproducibility. Texts sharing many
    /// characters land close together, which is enough to exercise ranking.
    pub fn generate(text: &str, dimension: usize) -> Vec<f32> {
        let mut vec = vec![0.0; dimension];
        if dimension == 0 {
            return vec;
        }

        for (i, c) in text.chars().enumerate() {
            let idx = (c as usize + i) % dimension;
            vec[idx] += 0.1;
        }

        Self::normalize(&mut vec);
        vec
    }

    /// Generate a pseudo-random unit vector from a seed.
    pub fn generate_with_seed(seed: u64, dimension: usize) -> Vec<f32> {
        let mut vec = vec![0.0; dimension];
        let mut state = seed;

        // LCG
        for item in vec.iter_mut() {
            state = state.wrapping_mul(1664525).wrapping_add(1013904223);
            *item = ((state % 1000) as f32) / 1000.0 - 0.5;
        }

        Self::normalize(&mut vec);
        vec
    }

    fn normalize(vec: &mut [f32]) {
        let magnitude: f32 = vec.iter().map(|x| x * x).sum::<f32>().sqrt();
        if magnitude > 0.0 {
            vec.iter_mut().for_each(|x| *x /= magnitude);
        }
    }
}
