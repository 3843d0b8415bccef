//! # Starsearch Protocols
//!
//! Shared definitions for the starsearch retrieval engine.
//! Contains only types and interface definitions - no implementations.
//!
//! ## Collaborator Traits
//!
//! - [`EmbeddingProvider`] - Turns text into a fixed-width vector
//! - [`RowStore`] - Metadata rows keyed by repository id, with substring query
//!
//! ## Core Types
//!
//! - [`RepoRecord`] - A starred repository as loaded during a sync
//! - [`RepoMetadata`] - The read-only metadata row the engine returns
//! - [`Candidate`] - One ranked result, tagged with its [`MatchOrigin`]
//! - [`SearchMode`] - Vector, lexical or fused retrieval

pub mod embedding;
pub mod error;
pub mod rowstore;
pub mod types;

pub use embedding::{Embedding, EmbeddingProvider};
pub use error::{EmbeddingError, ProtocolError, RetrievalError};
pub use rowstore::{RowStore, RowStoreStats};
pub use types::*;
