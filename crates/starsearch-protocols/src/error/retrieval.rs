//! Retrieval engine errors.
//!
//! Every variant names the stage that failed so a caller can decide
//! whether to retry, degrade or abort.

use thiserror::Error;

use super::EmbeddingError;

#[derive(Debug, Error)]
pub enum RetrievalError {
    /// Queried before any index generation was loaded.
    #[error("Vector store not ready: no index generation loaded, run a sync first")]
    NotReady,

    /// Query or persisted vector width disagrees with the configured dimension.
    #[error("Dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    /// The parallel id and vector sequences have different lengths.
    #[error("Parallel array mismatch: {ids} ids but {rows} vector rows")]
    LengthMismatch { ids: usize, rows: usize },

    #[error("Invalid vector for entity {entity_id}: {reason}")]
    InvalidVector { entity_id: i64, reason: String },

    #[error("Embedding unavailable: {0}")]
    EmbeddingUnavailable(String),

    #[error("Row store unavailable: {0}")]
    RowStoreUnavailable(String),

    #[error("Corrupt vector artifact: {0}")]
    CorruptArtifact(String),

    #[error("Storage error: {0}")]
    Storage(String),
}

impl RetrievalError {
    /// The pipeline stage the error originated from.
    pub fn stage(&self) -> &'static str {
        match self {
            Self::NotReady
            | Self::DimensionMismatch { .. }
            | Self::LengthMismatch { .. }
            | Self::InvalidVector { .. } => "vector",
            Self::EmbeddingUnavailable(_) => "embedding",
            Self::RowStoreUnavailable(_) => "rowstore",
            Self::CorruptArtifact(_) | Self::Storage(_) => "artifact",
        }
    }

    /// Whether retrying the same call later may succeed.
    ///
    /// Only failures of external collaborators qualify; a missing or
    /// corrupted index needs a re-sync, not a retry.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Self::EmbeddingUnavailable(_) | Self::RowStoreUnavailable(_)
        )
    }
}

impl From<EmbeddingError> for RetrievalError {
    fn from(err: EmbeddingError) -> Self {
        Self::EmbeddingUnavailable(err.to_string())
    }
}
