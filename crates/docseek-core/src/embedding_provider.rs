//! Embedding provider selection.

use serde::{Deserialize, Serialize};

/// Embedding provider used to generate document and query vectors.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EmbeddingProvider {
    /// Local Ollama instance (default)
    #[default]
    Ollama,
    /// Cohere API
    Cohere,
    /// Deterministic in-process vectors, for tests and offline runs
    Mock,
}

impl EmbeddingProvider {
    /// Whether the provider needs network access.
    pub fn is_remote(&self) -> bool {
        !matches!(self, Self::Mock)
    }
}

impl std::fmt::Display for EmbeddingProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Ollama => write!(f, "ollama"),
            Self::Cohere => write!(f, "cohere"),
            Self::Mock => write!(f, "mock"),
        }
    }
}

impl std::str::FromStr for EmbeddingProvider {
    type Err = String;
    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "ollama" => Ok(Self::Ollama),
            "cohere" => Ok(Self::Cohere),
            "mock" => Ok(Self::Mock),
            _ => Err(format!("Invalid embedding provider: {}", s)),
        }
    }
}
