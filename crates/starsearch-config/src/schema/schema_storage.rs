//! Storage and embedding configuration types.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Where the row store and the vector artifact live.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Base directory; `~` is expanded.
    #[serde(default = "default_data_dir")]
    pub data_dir: String,

    /// SQLite database file, relative to `data_dir` unless absolute.
    #[serde(default = "default_database")]
    pub database: String,

    /// Vector artifact prefix, relative to `data_dir` unless absolute.
    #[serde(default = "default_vectors")]
    pub vectors: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            database: default_database(),
            vectors: default_vectors(),
        }
    }
}

impl StorageConfig {
    /// `data_dir` with `~` expanded.
    pub fn data_dir(&self) -> PathBuf {
        PathBuf::from(shellexpand::tilde(&self.data_dir).as_ref())
    }

    pub fn database_path(&self) -> PathBuf {
        self.resolve(&self.database)
    }

    /// Prefix for `<prefix>.ids.bin` and `<prefix>.vectors.bin`.
    pub fn vectors_prefix(&self) -> PathBuf {
        self.resolve(&self.vectors)
    }

    fn resolve(&self, name: &str) -> PathBuf {
        let expanded = PathBuf::from(shellexpand::tilde(name).as_ref());
        if expanded.is_absolute() {
            expanded
        } else {
            self.data_dir().join(expanded)
        }
    }
}

fn default_data_dir() -> String {
    dirs::home_dir()
        .map(|home| home.join(".starsearch").to_string_lossy().into_owned())
        .unwrap_or_else(|| ".starsearch".to_string())
}

fn default_database() -> String {
    "stars.sqlite".to_string()
}

fn default_vectors() -> String {
    "stars".to_string()
}

/// Embedding provider configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmbeddingConfig {
    /// `"openai"` (any OpenAI-compatible endpoint) or `"hash"` (offline).
    #[serde(default = "default_provider")]
    pub provider: String,

    #[serde(default = "default_model")]
    pub model: String,

    #[serde(default = "default_base_url")]
    pub base_url: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    /// Vector width `D`. Must match the persisted artifact.
    #[serde(default = "default_dimension")]
    pub dimension: usize,

    /// Texts per embedding request during a sync.
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            provider: default_provider(),
            model: default_model(),
            base_url: default_base_url(),
            api_key: None,
            dimension: default_dimension(),
            batch_size: default_batch_size(),
        }
    }
}

fn default_provider() -> String {
    "openai".to_string()
}

fn default_model() -> String {
    "text-embedding-3-small".to_string()
}

fn default_base_url() -> String {
    "https://api.openai.com/v1".to_string()
}

fn default_dimension() -> usize {
    1536
}

fn default_batch_size() -> usize {
    32
}
