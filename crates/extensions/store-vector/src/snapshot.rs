//! Immutable index generations.

use starsearch_protocols::embedding::normalize_in_place;
use starsearch_protocols::RetrievalError;

use crate::topk::{select_top_k, ScoredId};

/// One generation of the vector index: `ids[N]` and row-major `vectors[N×D]`.
///
/// Constructed only through [`VectorSnapshot::from_flat`], which enforces
/// `vectors.len() == ids.len() * dimension`. Never mutated afterwards.
#[derive(Debug)]
pub struct VectorSnapshot {
    generation: u64,
    dimension: usize,
    ids: Vec<i64>,
    vectors: Vec<f32>,
}

impl VectorSnapshot {
    pub fn from_flat(
        generation: u64,
        dimension: usize,
        ids: Vec<i64>,
        vectors: Vec<f32>,
    ) -> Result<Self, RetrievalError> {
        if dimension == 0 {
            return Err(RetrievalError::DimensionMismatch {
                expected: 1,
                actual: 0,
            });
        }
        if vectors.len() % dimension != 0 {
            return Err(RetrievalError::CorruptArtifact(format!(
                "{} floats is not a whole number of {}-wide rows",
                vectors.len(),
                dimension
            )));
        }
        let rows = vectors.len() / dimension;
        if rows != ids.len() {
            return Err(RetrievalError::LengthMismatch {
                ids: ids.len(),
                rows,
            });
        }

        Ok(Self {
            generation,
            dimension,
            ids,
            vectors,
        })
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn dimension(&self) -> usize {
        self.dimension
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn ids(&self) -> &[i64] {
        &self.ids
    }

    /// The flat row-major matrix.
    pub fn vectors(&self) -> &[f32] {
        &self.vectors
    }

    pub fn row(&self, index: usize) -> Option<&[f32]> {
        let start = index.checked_mul(self.dimension)?;
        self.vectors.get(start..start + self.dimension)
    }

    /// Exact top-k by cosine similarity.
    ///
    /// The query is normalized here; stored rows are unit length already,
    /// so similarity is a plain dot product. A zero query has no direction
    /// and yields an empty result.
    pub fn top_k(&self, query: &[f32], k: usize) -> Result<Vec<ScoredId>, RetrievalError> {
        if query.len() != self.dimension {
            return Err(RetrievalError::DimensionMismatch {
                expected: self.dimension,
                actual: query.len(),
            });
        }

        let mut query = query.to_vec();
        if !normalize_in_place(&mut query) {
            return Ok(Vec::new());
        }

        let scores = self
            .vectors
            .chunks_exact(self.dimension)
            .zip(self.ids.iter())
            .map(|(row, &id)| ScoredId::new(id, dot(row, &query)));

        Ok(select_top_k(scores, k))
    }
}

fn dot(a: &[f32], b: &[f32]) -> f32 {
    a.iter().zip(b).map(|(x, y)| x * y).sum()
}

#[cfg(test)]
#[path = "snapshot_tests.rs"]
mod tests;
