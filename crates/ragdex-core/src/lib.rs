//! Core traits and types for ragdex
//!
//! This crate defines the fundamental traits and types shared by the indexing
//! service, the tool server and the agent runtime. It provides capability-facing
//! interfaces for embedding models, search engines and LLM providers, making the
//! rest of the system test-friendly and backend-agnostic.

pub mod chunker;
pub mod embedder;
pub mod error;
pub mod llm;
pub mod search_engine;
pub mod types;

#[cfg(test)]
mod tests;

pub use chunker::{chunk_text, normalize_text};
pub use embedder::Embedder;
pub use error::{Error, Result};
pub use llm::{
    FunctionCall, FunctionDeclaration, FunctionResponse, GenerationRequest, LLMProvider,
    Message, Part, Role, ToolSpec,
};
pub use search_engine::{
    DEFAULT_NUM_CANDIDATES, META_DOCUMENT_ID, SearchEngine, SearchMode, SearchQuery,
};
pub use types::*;
