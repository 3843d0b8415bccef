//! Error types for the starsearch protocol layer.

mod embedding;
mod protocol;
mod retrieval;

pub use embedding::*;
pub use protocol::*;
pub use retrieval::*;
