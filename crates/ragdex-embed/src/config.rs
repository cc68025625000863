//! Embedding configuration

use serde::{Deserialize, Serialize};
use std::env;

use ragdex_core::{Error, Result};

/// Default sentence-transformers model
pub const DEFAULT_MODEL_ID: &str = "sentence-transformers/all-MiniLM-L6-v2";

/// Width produced by the default model, used by the hashing backend
pub const DEFAULT_DIMENSION: usize = 384;

/// Which embedder implementation to load
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EmbeddingBackend {
    Bert,
    Hash,
}

/// Configuration for the embedding provider
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmbeddingConfig {
    pub backend: EmbeddingBackend,
    pub model_id: String,
    /// Only consulted by the hashing backend
    pub hash_dimension: usize,
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            backend: EmbeddingBackend::Bert,
            model_id: DEFAULT_MODEL_ID.to_string(),
            hash_dimension: DEFAULT_DIMENSION,
        }
    }
}

impl EmbeddingConfig {
    /// Create configuration from environment variables
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();

        let backend = match env::var("EMBEDDING_BACKEND") {
            Ok(value) => match value.to_lowercase().as_str() {
                "bert" => EmbeddingBackend::Bert,
                "hash" => EmbeddingBackend::Hash,
                other => {
                    return Err(Error::Configuration(format!(
                        "EMBEDDING_BACKEND must be 'bert' or 'hash', got '{}'",
                        other
                    )));
                }
            },
            Err(_) => EmbeddingBackend::Bert,
        };

        let model_id = env::var("EMBEDDING_MODEL").unwrap_or_else(|_| DEFAULT_MODEL_ID.to_string());

        let hash_dimension = match env::var("EMBEDDING_DIM") {
            Ok(value) => value.parse().map_err(|_| {
                Error::Configuration(format!("EMBEDDING_DIM is not a number: {}", value))
            })?,
            Err(_) => DEFAULT_DIMENSION,
        };

        Ok(Self {
            backend,
            model_id,
            hash_dimension,
        })
    }

    /// Configuration for the hashing backend with an explicit width
    pub fn hashed(dimension: usize) -> Self {
        Self {
            backend: EmbeddingBackend::Hash,
            hash_dimension: dimension,
            ..Default::default()
        }
    }
}
