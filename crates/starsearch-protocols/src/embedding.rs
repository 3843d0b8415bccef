//! Embedding protocol definitions.
//!
//! Producing vectors from text is an external concern; the engine only
//! depends on the [`EmbeddingProvider`] contract.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::EmbeddingError;

/// Embedding result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Embedding {
    /// Vector representation.
    pub vector: Vec<f32>,
    /// Dimension of the embedding.
    pub dimension: usize,
}

impl Embedding {
    pub fn new(vector: Vec<f32>) -> Self {
        let dimension = vector.len();
        Self { vector, dimension }
    }

    /// Euclidean length of the vector.
    pub fn l2_norm(&self) -> f32 {
        l2_norm(&self.vector)
    }

    /// Scale to unit length. Returns `None` for a zero (or non-finite) vector.
    pub fn normalized(mut self) -> Option<Self> {
        if normalize_in_place(&mut self.vector) {
            Some(self)
        } else {
            None
        }
    }

    /// Whether `|‖v‖₂ - 1| < tolerance`.
    pub fn is_normalized(&self, tolerance: f32) -> bool {
        (self.l2_norm() - 1.0).abs() < tolerance
    }
}

/// Euclidean length of a slice.
pub fn l2_norm(vector: &[f32]) -> f32 {
    vector.iter().map(|x| x * x).sum::<f32>().sqrt()
}

/// Divide a vector by its L2 norm.
///
/// Leaves the slice untouched and returns `false` when the norm is zero or
/// not finite.
pub fn normalize_in_place(vector: &mut [f32]) -> bool {
    let norm = l2_norm(vector);
    if norm == 0.0 || !norm.is_finite() {
        return false;
    }
    for v in vector.iter_mut() {
        *v /= norm;
    }
    true
}

/// Trait for embedding providers.
#[async_trait]
pub trait EmbeddingProvider: Send + Sync {
    /// Generate embedding for text.
    async fn embed(&self, text: &str) -> Result<Embedding, EmbeddingError>;

    /// Generate embeddings for multiple texts, in input order.
    async fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Embedding>, EmbeddingError>;

    /// Get the embedding dimension.
    fn dimension(&self) -> usize;
}

#[cfg(test)]
#[path = "embedding_tests.rs"]
mod tests;
