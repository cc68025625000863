//! Document indexing service for ragdex
//!
//! Chunks, embeds and stores documents in a search engine, and serves the
//! operations over HTTP. The same [`IndexingService`] backs the tool server.

pub mod api;
mod config;
pub mod loader;
mod service;


use ragdex_embed::{EmbeddingConfig, load_embedder};
use ragdex_search::{SearchConfig, connect_engine};

pub use api::{router, run_server};
pub use config::ApiConfig;
pub use service::{
    DEFAULT_FILE_CHUNK_SIZE, DEFAULT_FILE_INDEX, DEFAULT_TEXT_CHUNK_SIZE, DEFAULT_TOP_K,
    INDEX_CONTENT_LIMIT, IndexingService,
};

pub use ragdex_core::{Error, Result};

/// Wire up the embedding model and search engine described by the configuration
pub fn build_service(
    embedding: &EmbeddingConfig,
    search: &SearchConfig,
) -> Result<IndexingService> {
    let embedder = load_embedder(embedding)?;
    let engine = connect_engine(search)?;
    Ok(IndexingService::new(engine, embedder, search.mode))
}
