//! Sentence embedding providers for ragdex
//!
//! This crate provides the candle-backed BERT implementation of the `Embedder`
//! trait and a deterministic hashing embedder for offline use.

mod bert;
mod config;
mod hash;


use std::sync::Arc;

use tracing::info;

pub use bert::BertEmbedder;
pub use config::{EmbeddingBackend, EmbeddingConfig};
pub use hash::HashEmbedder;

// Re-export core types for convenience
pub use ragdex_core::{Embedder, Error, Result};

/// Load the embedder selected by the configuration
pub fn load_embedder(config: &EmbeddingConfig) -> Result<Arc<dyn Embedder>> {
    let embedder: Arc<dyn Embedder> = match config.backend {
        EmbeddingBackend::Bert => Arc::new(BertEmbedder::from_hub(&config.model_id)?),
        EmbeddingBackend::Hash => Arc::new(HashEmbedder::new(config.hash_dimension)),
    };

    info!(
        model = embedder.model_id(),
        dimension = embedder.dimension(),
        "embedding model ready"
    );

    Ok(embedder)
}
