//! Embedding provider trait

use crate::Result;

/// Trait for sentence embedding models
///
/// Implementations are loaded once at startup and shared behind an `Arc`.
/// `encode` is synchronous CPU work; async callers should move it onto the
/// blocking pool.
pub trait Embedder: Send + Sync {
    /// Width of every vector this embedder produces
    fn dimension(&self) -> usize;

    /// Encode one piece of text into a vector of length `dimension()`
    fn encode(&self, text: &str) -> Result<Vec<f32>>;

    /// Identifier of the underlying model
    fn model_id(&self) -> &str;
}
