//! Search engine trait and query types

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::{ChunkDocument, Error, IndexSummary, Result, SearchHit};

/// Reserved identifier of the per-index metadata document
pub const META_DOCUMENT_ID: &str = "_meta_";

/// Default candidate pool considered by k-NN before final ranking
pub const DEFAULT_NUM_CANDIDATES: usize = 100;

/// How a query is executed against an index
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SearchMode {
    /// Approximate nearest neighbours over the `embedding` field
    Knn { num_candidates: usize },
    /// Lexical `multi_match` boosted by `cosineSimilarity + 1.0`
    Hybrid,
}

impl Default for SearchMode {
    fn default() -> Self {
        SearchMode::Knn {
            num_candidates: DEFAULT_NUM_CANDIDATES,
        }
    }
}

impl SearchMode {
    /// Parse a mode name as used in configuration
    pub fn from_name(name: &str, num_candidates: usize) -> Result<Self> {
        match name.trim().to_lowercase().as_str() {
            "knn" | "vector" => Ok(SearchMode::Knn { num_candidates }),
            "hybrid" | "script_score" => Ok(SearchMode::Hybrid),
            other => Err(Error::Configuration(format!(
                "unknown search mode '{}', expected 'knn' or 'hybrid'",
                other
            ))),
        }
    }
}

/// A query against a single index
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchQuery {
    pub text: String,
    pub vector: Vec<f32>,
    pub top_k: usize,
    pub mode: SearchMode,
}

/// Trait for full-text + vector search engines (e.g., Elasticsearch)
///
/// Implementations own no state of their own; the engine behind them is the
/// only persistence authority.
#[async_trait]
pub trait SearchEngine: Send + Sync {
    /// Create an index with text fields and a cosine `dense_vector` field.
    ///
    /// Returns `false` when the index already existed; that is not an error.
    async fn create_index(&self, name: &str, vector_dim: usize) -> Result<bool>;

    /// Whether an index with this name exists
    async fn index_exists(&self, name: &str) -> Result<bool>;

    /// Upsert the metadata document holding the index description
    async fn write_meta(&self, name: &str, description: &str) -> Result<()>;

    /// Read the index description, `None` when no metadata document exists
    async fn read_meta(&self, name: &str) -> Result<Option<String>>;

    /// Append a chunk document, returning the engine-assigned id
    async fn index_document(&self, name: &str, document: &ChunkDocument) -> Result<String>;

    /// Delete an index and all of its documents, `Error::NotFound` if absent
    async fn delete_index(&self, name: &str) -> Result<()>;

    /// Names of all indices
    async fn index_names(&self) -> Result<Vec<String>>;

    /// Run a ranked query
    async fn search(&self, name: &str, query: &SearchQuery) -> Result<Vec<SearchHit>>;

    /// Return up to `size` stored chunk documents, metadata excluded
    async fn match_all(&self, name: &str, size: usize) -> Result<Vec<SearchHit>>;

    /// List every index with its description.
    ///
    /// A missing metadata document yields an empty description; a failed
    /// metadata read degrades the same way and never aborts the listing.
    async fn list_indices(&self) -> Result<Vec<IndexSummary>> {
        let mut summaries = Vec::new();

        for index in self.index_names().await? {
            let description = match self.read_meta(&index).await {
                Ok(Some(description)) => description,
                Ok(None) => String::new(),
                Err(e) => {
                    warn!(index = %index, error = %e, "failed to read index metadata");
                    String::new()
                }
            };
            summaries.push(IndexSummary { index, description });
        }

        Ok(summaries)
    }
}
