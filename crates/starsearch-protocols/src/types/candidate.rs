//! Ranked search candidates.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::RepoMetadata;

/// Which retrieval path produced a result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchOrigin {
    Vector,
    Lexical,
    /// Found by both paths.
    Fused,
}

impl fmt::Display for MatchOrigin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Vector => "vector",
            Self::Lexical => "lexical",
            Self::Fused => "fused",
        };
        f.write_str(name)
    }
}

/// One search result. Lives for a single query.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Candidate {
    #[serde(flatten)]
    pub metadata: RepoMetadata,

    /// Cosine similarity to the query; `None` for lexical-only matches.
    #[serde(rename = "similarity")]
    pub score: Option<f32>,

    #[serde(rename = "match_origin")]
    pub origin: MatchOrigin,

    /// Accumulated reciprocal-rank score, set only on fused output.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fusion_score: Option<f32>,
}

impl Candidate {
    pub fn vector(metadata: RepoMetadata, similarity: f32) -> Self {
        Self {
            metadata,
            score: Some(similarity),
            origin: MatchOrigin::Vector,
            fusion_score: None,
        }
    }

    pub fn lexical(metadata: RepoMetadata) -> Self {
        Self {
            metadata,
            score: None,
            origin: MatchOrigin::Lexical,
            fusion_score: None,
        }
    }

    pub fn entity_id(&self) -> i64 {
        self.metadata.entity_id
    }

    /// Stable identity used to deduplicate across sources.
    pub fn key(&self) -> &str {
        &self.metadata.full_name
    }
}
