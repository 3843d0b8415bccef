//! Hybrid retrieval for starsearch.
//!
//! Combines exact vector similarity search with substring matching over
//! repository metadata, using weighted Reciprocal Rank Fusion (RRF) to
//! merge the two rankings.
//!
//! ## Modes
//!
//! - **Vector**: nearest neighbours of the query embedding
//! - **Lexical**: case-insensitive substring match, most popular first
//! - **Fused**: both, over-fetched at twice the limit and merged by RRF
//!
//! ## How It Works
//!
//! 1. The [`Indexer`] embeds every repository and publishes a new index
//!    generation to both the row store and the vector store
//! 2. The [`RetrievalEngine`] pins the current generation per query
//! 3. In fused mode the embedding + vector search and the lexical query
//!    run concurrently, then [`rrf_fuse`] produces the final ordering

mod embedding;
mod engine;
mod fusion;
mod indexer;
mod lexical;

#[cfg(test)]
mod test_support;

pub use embedding::{OpenAIEmbedding, OpenAIEmbeddingConfig};
pub use engine::{EmbeddingFailurePolicy, EngineConfig, EngineStatus, RetrievalEngine};
pub use fusion::{rrf_fuse, FusionConfig, DEFAULT_RRF_K};
pub use indexer::{Indexer, SyncReport, DEFAULT_BATCH_SIZE};
pub use lexical::LexicalIndex;
