//! # Starsearch Config
//!
//! Configuration management for the starsearch engine and its binary.

mod error;
mod loader;
mod schema;
mod validator;

pub use error::ConfigError;
pub use loader::ConfigLoader;
pub use schema::*;
pub use validator::{
    ConfigValidator, ValidationError, ValidationResult, ValidationWarning, EMBEDDING_PROVIDERS,
    SEARCH_MODES,
};
