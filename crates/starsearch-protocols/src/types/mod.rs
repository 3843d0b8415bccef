//! Common types used across the starsearch engine.

mod candidate;
mod mode;
mod repo;

pub use candidate::*;
pub use mode::*;
pub use repo::*;
