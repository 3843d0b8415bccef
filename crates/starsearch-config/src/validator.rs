//! Configuration validation.

use crate::error::ConfigError;
use crate::schema::Config;

/// Validation result.
#[derive(Debug, Default)]
pub struct ValidationResult {
    pub errors: Vec<ValidationError>,
    pub warnings: Vec<ValidationWarning>,
}

impl ValidationResult {
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn add_error(&mut self, error: ValidationError) {
        self.errors.push(error);
    }

    pub fn add_warning(&mut self, warning: ValidationWarning) {
        self.warnings.push(warning);
    }
}

/// A validation error.
#[derive(Debug)]
pub struct ValidationError {
    pub path: String,
    pub message: String,
}

impl ValidationError {
    pub fn new(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            message: message.into(),
        }
    }
}

/// A validation warning.
#[derive(Debug)]
pub struct ValidationWarning {
    pub path: String,
    pub message: String,
}

impl ValidationWarning {
    pub fn new(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            message: message.into(),
        }
    }
}

/// Mode names accepted for `search.default_mode`.
pub const SEARCH_MODES: &[&str] = &["vector", "semantic", "lexical", "keyword", "fused", "hybrid"];

/// Embedding providers the binary knows how to build.
pub const EMBEDDING_PROVIDERS: &[&str] = &["openai", "hash"];

/// Configuration validator.
pub struct ConfigValidator;

impl ConfigValidator {
    /// Validate the configuration.
    pub fn validate(config: &Config) -> Result<ValidationResult, ConfigError> {
        let mut result = ValidationResult::default();

        Self::validate_server(config, &mut result);
        Self::validate_search(config, &mut result);
        Self::validate_embedding(config, &mut result);
        Self::validate_storage(config, &mut result);

        Ok(result)
    }

    fn validate_server(config: &Config, result: &mut ValidationResult) {
        if config.server.port == 0 {
            result.add_error(ValidationError::new(
                "server.port",
                "Port cannot be 0",
            ));
        }

        if config.server.host.is_empty() {
            result.add_error(ValidationError::new(
                "server.host",
                "Host cannot be empty",
            ));
        }
    }

    fn validate_search(config: &Config, result: &mut ValidationResult) {
        let search = &config.search;

        let mode = search.default_mode.trim().to_ascii_lowercase();
        if !SEARCH_MODES.contains(&mode.as_str()) {
            result.add_error(ValidationError::new(
                "search.default_mode",
                format!(
                    "Unknown search mode '{}', valid values: {:?}",
                    search.default_mode, SEARCH_MODES
                ),
            ));
        }

        if !(0.0..=1.0).contains(&search.semantic_weight) {
            result.add_error(ValidationError::new(
                "search.semantic_weight",
                "semantic_weight must be between 0.0 and 1.0",
            ));
        }

        if search.rrf_k == 0 {
            result.add_error(ValidationError::new(
                "search.rrf_k",
                "rrf_k must be greater than 0",
            ));
        }

        if search.default_limit == 0 {
            result.add_error(ValidationError::new(
                "search.default_limit",
                "default_limit must be greater than 0",
            ));
        }

        if search.default_limit > search.max_limit {
            result.add_error(ValidationError::new(
                "search.default_limit",
                format!(
                    "default_limit ({}) exceeds max_limit ({})",
                    search.default_limit, search.max_limit
                ),
            ));
        }

        if search.max_limit > 1000 {
            result.add_warning(ValidationWarning::new(
                "search.max_limit",
                "max_limit is very high (>1000), fused queries over-fetch twice this many rows",
            ));
        }

        if !matches!(search.on_embedding_failure.as_str(), "fail" | "degrade") {
            result.add_error(ValidationError::new(
                "search.on_embedding_failure",
                "on_embedding_failure must be 'fail' or 'degrade'",
            ));
        }
    }

    fn validate_embedding(config: &Config, result: &mut ValidationResult) {
        let embedding = &config.embedding;

        if !EMBEDDING_PROVIDERS.contains(&embedding.provider.as_str()) {
            result.add_error(ValidationError::new(
                "embedding.provider",
                format!(
                    "Unknown embedding provider '{}', valid values: {:?}",
                    embedding.provider, EMBEDDING_PROVIDERS
                ),
            ));
        }

        if embedding.dimension == 0 {
            result.add_error(ValidationError::new(
                "embedding.dimension",
                "dimension must be greater than 0",
            ));
        }

        if embedding.batch_size == 0 {
            result.add_error(ValidationError::new(
                "embedding.batch_size",
                "batch_size must be greater than 0",
            ));
        }

        if embedding.provider == "openai" {
            if embedding.api_key.as_deref().is_none_or(str::is_empty) {
                result.add_warning(ValidationWarning::new(
                    "embedding.api_key",
                    "API key is not set, may need to be set via environment variable",
                ));
            }

            let url = &embedding.base_url;
            if !url.starts_with("http://") && !url.starts_with("https://") {
                result.add_error(ValidationError::new(
                    "embedding.base_url",
                    "base_url must start with http:// or https://",
                ));
            }
        }
    }

    fn validate_storage(config: &Config, result: &mut ValidationResult) {
        if config.storage.database.trim().is_empty() {
            result.add_error(ValidationError::new(
                "storage.database",
                "database file name cannot be empty",
            ));
        }

        if config.storage.vectors.trim().is_empty() {
            result.add_error(ValidationError::new(
                "storage.vectors",
                "vector artifact prefix cannot be empty",
            ));
        }
    }
}

#[cfg(test)]
#[path = "validator_tests.rs"]
mod tests;
