//! Vector store for starsearch.
//!
//! Holds the dense embedding matrix and its parallel id array, and answers
//! exact top-k cosine similarity queries by brute force.
//!
//! Each `replace_all` publishes a new immutable [`VectorSnapshot`]
//! (an index generation). Readers pin a snapshot for the duration of a
//! query, so a concurrent reload never exposes a torn id/vector pair.

mod artifact;
mod embedding;
mod snapshot;
mod store;
mod topk;

pub use artifact::VectorArtifact;
pub use embedding::SimpleHashEmbedding;
pub use snapshot::VectorSnapshot;
pub use store::VectorStore;
pub use topk::{select_top_k, ScoredId};
