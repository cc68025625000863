//! Common types used across the ragdex system

use serde::{Deserialize, Serialize};

/// One unit of indexed content as stored in the search engine
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChunkDocument {
    /// Label inherited from the source, e.g. `"notes.txt - chunk 2"`
    pub description: String,
    pub content: String,
    pub embedding: Vec<f32>,
}

/// A ranked document returned by a query
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchHit {
    pub description: String,
    pub content: String,
    pub score: f32,
}

/// An index name paired with its human-readable description
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexSummary {
    pub index: String,
    pub description: String,
}

/// Outcome of an idempotent index creation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexCreation {
    pub index: String,
    /// False when the index already existed
    pub created: bool,
    pub description: String,
}

/// Outcome of chunked ingestion into an index
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IngestionReport {
    pub index: String,
    pub source: String,
    pub chunks_indexed: usize,
}
