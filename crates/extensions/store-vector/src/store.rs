//! Vector store with atomically published generations.

use std::collections::HashSet;
use std::sync::Arc;

use parking_lot::{Mutex, RwLock};
use tracing::{debug, info};

use starsearch_protocols::embedding::l2_norm;
use starsearch_protocols::{Embedding, RetrievalError};

use crate::artifact::VectorArtifact;
use crate::snapshot::VectorSnapshot;
use crate::topk::ScoredId;

/// Exact brute-force vector store.
///
/// Readers clone the current `Arc<VectorSnapshot>` under a short read lock
/// and search outside it, so concurrent queries never block each other.
/// `replace_all` validates and persists the new arrays first and takes the
/// write lock only to swap the pointer.
pub struct VectorStore {
    dimension: usize,
    current: RwLock<Option<Arc<VectorSnapshot>>>,
    writer: Mutex<()>,
    artifact: Option<VectorArtifact>,
}

impl VectorStore {
    /// A store with no persistence. Queries fail with `NotReady` until the
    /// first `replace_all`.
    pub fn in_memory(dimension: usize) -> Self {
        Self {
            dimension,
            current: RwLock::new(None),
            writer: Mutex::new(()),
            artifact: None,
        }
    }

    /// Open a persisted store, loading the artifact once if it exists.
    pub fn open(artifact: VectorArtifact, dimension: usize) -> Result<Self, RetrievalError> {
        let loaded = match artifact.read(dimension)? {
            Some((ids, vectors)) => {
                check_unit_rows(&ids, &vectors, dimension)?;
                let snapshot = VectorSnapshot::from_flat(1, dimension, ids, vectors)?;
                info!(
                    "Loaded {} vectors (dimension {}) from {}",
                    snapshot.len(),
                    dimension,
                    artifact.ids_path().display()
                );
                Some(Arc::new(snapshot))
            }
            None => {
                debug!(
                    "No vector artifact at {}, store starts empty",
                    artifact.ids_path().display()
                );
                None
            }
        };

        Ok(Self {
            dimension,
            current: RwLock::new(loaded),
            writer: Mutex::new(()),
            artifact: Some(artifact),
        })
    }

    /// Configured embedding width `D`.
    pub fn dimension(&self) -> usize {
        self.dimension
    }

    pub fn is_ready(&self) -> bool {
        self.current.read().is_some()
    }

    /// Generation of the published snapshot, if any.
    pub fn generation(&self) -> Option<u64> {
        self.current.read().as_ref().map(|s| s.generation())
    }

    /// Number of indexed vectors (0 before the first load).
    pub fn len(&self) -> usize {
        self.current.read().as_ref().map_or(0, |s| s.len())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Pin the current generation.
    pub fn snapshot(&self) -> Result<Arc<VectorSnapshot>, RetrievalError> {
        self.current.read().clone().ok_or(RetrievalError::NotReady)
    }

    /// Exact top-k against the current generation.
    pub fn top_k(&self, query: &[f32], k: usize) -> Result<Vec<ScoredId>, RetrievalError> {
        let snapshot = self.snapshot()?;
        snapshot.top_k(query, k)
    }

    /// Replace both arrays with a new generation and return its number.
    ///
    /// Every row is normalized to unit length; rows of the wrong width, zero
    /// or non-finite rows, and duplicate ids are rejected before anything
    /// is persisted or published.
    pub fn replace_all(
        &self,
        ids: Vec<i64>,
        vectors: Vec<Embedding>,
    ) -> Result<u64, RetrievalError> {
        let _guard = self.writer.lock();

        if ids.len() != vectors.len() {
            return Err(RetrievalError::LengthMismatch {
                ids: ids.len(),
                rows: vectors.len(),
            });
        }

        let mut seen = HashSet::with_capacity(ids.len());
        let mut flat = Vec::with_capacity(ids.len() * self.dimension);
        for (&id, embedding) in ids.iter().zip(vectors) {
            if !seen.insert(id) {
                return Err(RetrievalError::InvalidVector {
                    entity_id: id,
                    reason: "duplicate id".to_string(),
                });
            }
            if embedding.vector.len() != self.dimension {
                return Err(RetrievalError::DimensionMismatch {
                    expected: self.dimension,
                    actual: embedding.vector.len(),
                });
            }
            let unit = embedding
                .normalized()
                .ok_or_else(|| RetrievalError::InvalidVector {
                    entity_id: id,
                    reason: "vector has zero or non-finite norm".to_string(),
                })?;
            flat.extend_from_slice(&unit.vector);
        }

        let generation = self.generation().map_or(1, |g| g + 1);
        let snapshot = VectorSnapshot::from_flat(generation, self.dimension, ids, flat)?;

        if let Some(artifact) = &self.artifact {
            artifact.write(snapshot.ids(), snapshot.vectors())?;
        }

        let count = snapshot.len();
        *self.current.write() = Some(Arc::new(snapshot));

        info!("Published vector generation {} ({} vectors)", generation, count);
        Ok(generation)
    }
}

/// Allowed drift of a persisted row's norm from 1.
const UNIT_NORM_TOLERANCE: f32 = 1e-4;

/// Every persisted row was normalized on write; anything else means the
/// artifact was not produced by `replace_all`.
fn check_unit_rows(ids: &[i64], vectors: &[f32], dimension: usize) -> Result<(), RetrievalError> {
    if dimension == 0 {
        return Ok(());
    }
    for (row, id) in vectors.chunks_exact(dimension).zip(ids) {
        let norm = l2_norm(row);
        if !norm.is_finite() || (norm - 1.0).abs() >= UNIT_NORM_TOLERANCE {
            return Err(RetrievalError::CorruptArtifact(format!(
                "row for entity {} has norm {}, expected 1",
                id, norm
            )));
        }
    }
    Ok(())
}

#[cfg(test)]
#[path = "store_tests.rs"]
mod tests;
