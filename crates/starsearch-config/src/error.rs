//! Configuration errors.

use thiserror::Error;

use crate::validator::ValidationResult;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Config file not found: {0}")]
    NotFound(String),

    #[error("Invalid config format: {0}")]
    InvalidFormat(String),

    #[error("Missing required field: {0}")]
    MissingField(String),

    #[error("Invalid value for {field}: {message}")]
    InvalidValue { field: String, message: String },

    #[error("Environment variable not set: {0}")]
    EnvVarNotSet(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),
}

impl ConfigError {
    /// The first validation error, if any, as a `ConfigError`.
    pub fn from_validation(result: &ValidationResult) -> Option<Self> {
        result.errors.first().map(|e| Self::InvalidValue {
            field: e.path.clone(),
            message: e.message.clone(),
        })
    }
}
