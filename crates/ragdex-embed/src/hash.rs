//! Deterministic hashing embedder

use std::hash::{Hash, Hasher};
use twox_hash::XxHash64;

use ragdex_core::{Embedder, Error, Result};

/// Bag-of-words embedder that hashes lowercase tokens into a fixed-width vector.
///
/// It needs no model files, so it backs offline runs and tests. Texts that
/// share words land close together under cosine similarity.
pub struct HashEmbedder {
    dimension: usize,
    model_id: String,
}

impl HashEmbedder {
    pub fn new(dimension: usize) -> Self {
        Self {
            dimension,
            model_id: format!("hash-{}", dimension),
        }
    }
}

impl Embedder for HashEmbedder {
    fn dimension(&self) -> usize {
        self.dimension
    }

    fn encode(&self, text: &str) -> Result<Vec<f32>> {
        if self.dimension == 0 {
            return Err(Error::Embedding("embedding dimension is zero".to_string()));
        }

        let mut vector = vec![0f32; self.dimension];
        for token in text
            .split(|c: char| !c.is_alphanumeric())
            .filter(|t| !t.is_empty())
        {
            let mut hasher = XxHash64::with_seed(0);
            token.to_lowercase().hash(&mut hasher);
            let h = hasher.finish();
            let sign = if h >> 63 == 0 { 1.0 } else { -1.0 };
            vector[(h as usize) % self.dimension] += sign;
        }

        let norm = vector.iter().map(|x| x * x).sum::<f32>().sqrt();
        if norm > 0.0 {
            for x in &mut vector {
                *x /= norm;
            }
        }

        Ok(vector)
    }

    fn model_id(&self) -> &str {
        &self.model_id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cosine(a: &[f32], b: &[f32]) -> f32 {
        a.iter().zip(b).map(|(x, y)| x * y).sum()
    }

    #[test]
    fn test_shape_and_norm() {
        let embedder = HashEmbedder::new(384);
        let v = embedder.encode("hello world").unwrap();

        assert_eq!(v.len(), 384);
        let norm: f32 = v.iter().map(|x| x * x).sum::<f32>().sqrt();
        assert!((norm - 1.0).abs() < 1e-5);
    }

    #[test]
    fn test_deterministic() {
        let embedder = HashEmbedder::new(64);
        assert_eq!(
            embedder.encode("same input").unwrap(),
            embedder.encode("same input").unwrap()
        );
    }

    #[test]
    fn test_shared_words_are_closer() {
        let embedder = HashEmbedder::new(256);
        let query = embedder.encode("elasticsearch cluster").unwrap();
        let related = embedder.encode("Setting up an Elasticsearch cluster").unwrap();
        let unrelated = embedder.encode("banana bread recipe").unwrap();

        assert!(cosine(&query, &related) > cosine(&query, &unrelated));
    }

    #[test]
    fn test_empty_text_is_zero_vector() {
        let embedder = HashEmbedder::new(8);
        assert_eq!(embedder.encode("   ").unwrap(), vec![0.0; 8]);
    }

    #[test]
    fn test_zero_dimension_rejected() {
        assert!(HashEmbedder::new(0).encode("text").is_err());
    }
}
