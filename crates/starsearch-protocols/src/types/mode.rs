//! Search mode selection.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ProtocolError;

/// Default share of the fused score given to the vector ranking.
pub const DEFAULT_SEMANTIC_WEIGHT: f32 = 0.7;

/// How a query is answered. Parsed once at the boundary.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "lowercase")]
pub enum SearchMode {
    /// Nearest neighbours of the query embedding.
    Vector,
    /// Substring match over name and description.
    Lexical,
    /// Both rankings merged by weighted reciprocal rank fusion.
    /// The lexical list gets `1 - semantic_weight`.
    Fused { semantic_weight: f32 },
}

impl SearchMode {
    /// Fused mode with a validated weight.
    pub fn fused(semantic_weight: f32) -> Result<Self, ProtocolError> {
        if !(0.0..=1.0).contains(&semantic_weight) {
            return Err(ProtocolError::InvalidWeight(semantic_weight));
        }
        Ok(Self::Fused { semantic_weight })
    }

    /// Parse a mode name, accepting the legacy aliases
    /// `semantic`, `keyword` and `hybrid`.
    pub fn parse(name: &str, semantic_weight: f32) -> Result<Self, ProtocolError> {
        match name.trim().to_ascii_lowercase().as_str() {
            "vector" | "semantic" => Ok(Self::Vector),
            "lexical" | "keyword" => Ok(Self::Lexical),
            "fused" | "hybrid" => Self::fused(semantic_weight),
            other => Err(ProtocolError::InvalidMode(other.to_string())),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Vector => "vector",
            Self::Lexical => "lexical",
            Self::Fused { .. } => "fused",
        }
    }

    pub fn uses_vectors(&self) -> bool {
        !matches!(self, Self::Lexical)
    }
}

impl Default for SearchMode {
    fn default() -> Self {
        Self::Fused {
            semantic_weight: DEFAULT_SEMANTIC_WEIGHT,
        }
    }
}

impl FromStr for SearchMode {
    type Err = ProtocolError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s, DEFAULT_SEMANTIC_WEIGHT)
    }
}

impl fmt::Display for SearchMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_canonical_names() {
        assert_eq!(SearchMode::parse("vector", 0.5).unwrap(), SearchMode::Vector);
        assert_eq!(SearchMode::parse("lexical", 0.5).unwrap(), SearchMode::Lexical);
        assert_eq!(
            SearchMode::parse("fused", 0.5).unwrap(),
            SearchMode::Fused { semantic_weight: 0.5 }
        );
    }

    #[test]
    fn test_parse_aliases() {
        assert_eq!("semantic".parse::<SearchMode>().unwrap(), SearchMode::Vector);
        assert_eq!("KEYWORD".parse::<SearchMode>().unwrap(), SearchMode::Lexical);
        assert_eq!("hybrid".parse::<SearchMode>().unwrap(), SearchMode::default());
    }

    #[test]
    fn test_parse_unknown_mode() {
        let err = SearchMode::parse("fuzzy", 0.7).unwrap_err();
        assert!(matches!(err, ProtocolError::InvalidMode(_)));
    }

    #[test]
    fn test_weight_bounds() {
        assert!(SearchMode::fused(0.0).is_ok());
        assert!(SearchMode::fused(1.0).is_ok());
        assert!(SearchMode::fused(1.01).is_err());
        assert!(SearchMode::fused(-0.1).is_err());
        assert!(SearchMode::fused(f32::NAN).is_err());
    }

    #[test]
    fn test_default_is_fused() {
        assert_eq!(
            SearchMode::default(),
            SearchMode::Fused { semantic_weight: DEFAULT_SEMANTIC_WEIGHT }
        );
        assert!(SearchMode::default().uses_vectors());
        assert!(!SearchMode::Lexical.uses_vectors());
    }

    #[test]
    fn test_display() {
        assert_eq!(SearchMode::default().to_string(), "fused");
    }
}
