//! Search configuration types.

use serde::{Deserialize, Serialize};

/// Query defaults and fusion tuning.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchConfig {
    /// `vector`, `lexical` or `fused` (aliases `semantic`, `keyword`, `hybrid`).
    #[serde(default = "default_mode")]
    pub default_mode: String,

    #[serde(default = "default_limit")]
    pub default_limit: usize,

    /// Upper bound applied to every requested limit.
    #[serde(default = "default_max_limit")]
    pub max_limit: usize,

    /// Share of the fused score given to the vector ranking.
    #[serde(default = "default_semantic_weight")]
    pub semantic_weight: f32,

    /// RRF damping constant.
    #[serde(default = "default_rrf_k")]
    pub rrf_k: u32,

    /// `fail` or `degrade` (answer fused queries lexically when the
    /// embedding service is down).
    #[serde(default = "default_on_embedding_failure")]
    pub on_embedding_failure: String,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            default_mode: default_mode(),
            default_limit: default_limit(),
            max_limit: default_max_limit(),
            semantic_weight: default_semantic_weight(),
            rrf_k: default_rrf_k(),
            on_embedding_failure: default_on_embedding_failure(),
        }
    }
}

impl SearchConfig {
    /// Cap a requested limit at `max_limit`, falling back to the default
    /// when none was given.
    pub fn effective_limit(&self, requested: Option<usize>) -> usize {
        requested.unwrap_or(self.default_limit).min(self.max_limit)
    }
}

fn default_mode() -> String {
    "fused".to_string()
}

fn default_limit() -> usize {
    10
}

fn default_max_limit() -> usize {
    100
}

fn default_semantic_weight() -> f32 {
    0.7
}

fn default_rrf_k() -> u32 {
    60
}

fn default_on_embedding_failure() -> String {
    "fail".to_string()
}
