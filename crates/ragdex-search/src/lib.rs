//! Search engine clients for ragdex
//!
//! This crate provides the Elasticsearch implementation of the `SearchEngine`
//! trait, the query bodies it sends, and an in-memory engine with the same
//! contract for tests and offline runs.

mod config;
mod elastic;
mod memory;
pub mod query;


use std::sync::Arc;

use tracing::info;

pub use config::{SearchBackend, SearchConfig};
pub use elastic::ElasticsearchClient;
pub use memory::InMemorySearchEngine;

// Re-export core types for convenience
pub use ragdex_core::{
    ChunkDocument, Error, IndexSummary, META_DOCUMENT_ID, Result, SearchEngine, SearchHit,
    SearchMode, SearchQuery,
};

/// Build the search engine selected by the configuration
pub fn connect_engine(config: &SearchConfig) -> Result<Arc<dyn SearchEngine>> {
    let engine: Arc<dyn SearchEngine> = match config.backend {
        SearchBackend::Elasticsearch => Arc::new(ElasticsearchClient::new(config)?),
        SearchBackend::Memory => Arc::new(InMemorySearchEngine::new()),
    };

    info!(backend = ?config.backend, endpoint = %config.endpoint, mode = ?config.mode, "search engine configured");
    Ok(engine)
}
