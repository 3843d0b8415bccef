//! Configuration loader.

use std::fs;
use std::path::{Path, PathBuf};

use crate::error::ConfigError;
use crate::schema::Config;

/// Configuration loader with environment variable substitution.
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration from a TOML file.
    pub fn load(path: &Path) -> Result<Config, ConfigError> {
        if !path.exists() {
            return Err(ConfigError::NotFound(path.display().to_string()));
        }
        let content = fs::read_to_string(path)?;
        Self::load_str(&content)
    }

    /// Load configuration from a string.
    pub fn load_str(content: &str) -> Result<Config, ConfigError> {
        let expanded = Self::expand_env_vars(content)?;
        let config: Config = toml::from_str(&expanded)?;
        Ok(config)
    }

    /// Load `path` if given, else the default location if it exists, else
    /// built-in defaults.
    pub fn load_or_default(path: Option<&Path>) -> Result<Config, ConfigError> {
        match path {
            Some(path) => Self::load(path),
            None => match Self::default_path() {
                Some(default) if default.exists() => Self::load(&default),
                _ => Ok(Config::default()),
            },
        }
    }

    /// `~/.starsearch/config.toml`.
    pub fn default_path() -> Option<PathBuf> {
        dirs::home_dir().map(|home| home.join(".starsearch").join("config.toml"))
    }

    /// Expand environment variables in the format `${VAR}`.
    ///
    /// Comment lines are left untouched, so a commented-out `${VAR}` does
    /// not need to be set.
    fn expand_env_vars(content: &str) -> Result<String, ConfigError> {
        let re = regex::Regex::new(r"\$\{([^}]+)\}")
            .map_err(|e| ConfigError::InvalidFormat(e.to_string()))?;

        let mut result = String::with_capacity(content.len());
        for line in content.split_inclusive('\n') {
            if line.trim_start().starts_with('#') {
                result.push_str(line);
                continue;
            }
            let mut expanded = line.to_string();
            for cap in re.captures_iter(line) {
                let var_name = &cap[1];
                let var_value = std::env::var(var_name)
                    .map_err(|_| ConfigError::EnvVarNotSet(var_name.to_string()))?;
                expanded = expanded.replace(&cap[0], &var_value);
            }
            result.push_str(&expanded);
        }

        Ok(result)
    }

    /// Expand shell-style paths (e.g., `~/.starsearch`).
    pub fn expand_path(path: &str) -> String {
        shellexpand::tilde(path).to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_load_empty_config() {
        let config = ConfigLoader::load_str("").unwrap();
        assert_eq!(config.server.port, 8000);
        assert_eq!(config.search.default_limit, 10);
    }

    #[test]
    fn test_expand_path() {
        let expanded = ConfigLoader::expand_path("~/.starsearch");
        assert!(!expanded.starts_with('~'));
    }

    #[test]
    fn test_load_basic_config() {
        let content = r#"
            [server]
            host = "0.0.0.0"
            port = 3000
        "#;
        let config = ConfigLoader::load_str(content).unwrap();
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.server.port, 3000);
    }

    #[test]
    fn test_load_full_config() {
        let content = r#"
            [storage]
            data_dir = "/tmp/stars"
            database = "db.sqlite"
            vectors = "vec"

            [search]
            default_mode = "lexical"
            default_limit = 5
            max_limit = 50
            semantic_weight = 0.4
            rrf_k = 30
            on_embedding_failure = "degrade"

            [embedding]
            provider = "hash"
            dimension = 256
            batch_size = 8

            [logging]
            level = "debug"
            file = true
        "#;
        let config = ConfigLoader::load_str(content).unwrap();
        assert_eq!(config.storage.data_dir, "/tmp/stars");
        assert_eq!(config.search.default_mode, "lexical");
        assert_eq!(config.search.rrf_k, 30);
        assert_eq!(config.search.on_embedding_failure, "degrade");
        assert_eq!(config.embedding.provider, "hash");
        assert_eq!(config.embedding.dimension, 256);
        // Unspecified fields keep their defaults.
        assert_eq!(config.embedding.model, "text-embedding-3-small");
        assert_eq!(config.logging.level, "debug");
        assert!(config.logging.file);
    }

    #[test]
    fn test_load_from_file() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "[server]").unwrap();
        writeln!(file, "port = 5000").unwrap();

        let config = ConfigLoader::load(file.path()).unwrap();
        assert_eq!(config.server.port, 5000);
    }

    #[test]
    fn test_load_nonexistent_file() {
        let result = ConfigLoader::load(Path::new("/nonexistent/path/config.toml"));
        assert!(matches!(result, Err(ConfigError::NotFound(_))));
    }

    #[test]
    fn test_load_or_default_with_explicit_path() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "[search]").unwrap();
        writeln!(file, "default_limit = 3").unwrap();

        let config = ConfigLoader::load_or_default(Some(file.path())).unwrap();
        assert_eq!(config.search.default_limit, 3);
    }

    #[test]
    fn test_load_invalid_toml() {
        let content = "invalid = [unclosed";
        let result = ConfigLoader::load_str(content);
        assert!(matches!(result, Err(ConfigError::TomlParse(_))));
    }

    #[test]
    fn test_load_wrong_type() {
        let content = r#"
            [search]
            default_limit = "ten"
        "#;
        assert!(ConfigLoader::load_str(content).is_err());
    }

    #[test]
    fn test_api_key_from_env() {
        // SAFETY: This test runs in isolation and sets a unique test-only env var
        unsafe {
            std::env::set_var("STARSEARCH_TEST_API_KEY", "sk-from-env");
        }
        let content = r#"
            [embedding]
            api_key = "${STARSEARCH_TEST_API_KEY}"
        "#;
        let config = ConfigLoader::load_str(content).unwrap();
        assert_eq!(config.embedding.api_key.as_deref(), Some("sk-from-env"));
        unsafe {
            std::env::remove_var("STARSEARCH_TEST_API_KEY");
        }
    }

    #[test]
    fn test_expand_env_vars_not_set() {
        let content = "value = \"${NONEXISTENT_TEST_VAR_12345}\"";
        let result = ConfigLoader::expand_env_vars(content);
        assert!(matches!(result, Err(ConfigError::EnvVarNotSet(_))));
    }

    #[test]
    fn test_commented_env_var_is_ignored() {
        let content = r#"
            [embedding]
            provider = "hash"
            # api_key = "${NONEXISTENT_TEST_VAR_12345}"
            dimension = 8
        "#;
        let config = ConfigLoader::load_str(content).unwrap();
        assert_eq!(config.embedding.provider, "hash");
        assert!(config.embedding.api_key.is_none());
    }

    #[test]
    fn test_default_config_file_loads_without_env() {
        let content = include_str!("../../../config/default.toml");
        let config = ConfigLoader::load_str(content).unwrap();
        assert!(config.embedding.api_key.is_none());
        assert_eq!(config.search.default_limit, 10);
    }

    #[test]
    fn test_expand_env_vars_no_vars() {
        let content = "value = \"no variables here\"";
        let expanded = ConfigLoader::expand_env_vars(content).unwrap();
        assert_eq!(expanded, content);
    }

    #[test]
    fn test_expand_path_no_tilde() {
        let path = "/usr/local/bin";
        let expanded = ConfigLoader::expand_path(path);
        assert_eq!(expanded, path);
    }

    #[test]
    fn test_default_path_location() {
        if let Some(path) = ConfigLoader::default_path() {
            assert!(path.ends_with(".starsearch/config.toml"));
        }
    }
}
