//! Request-shaping errors raised at the search boundary.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ProtocolError {
    #[error("Unknown search mode: {0} (expected vector, lexical or fused)")]
    InvalidMode(String),

    #[error("Semantic weight must be within [0, 1], got {0}")]
    InvalidWeight(f32),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_mode_error() {
        let err = ProtocolError::InvalidMode("fuzzy".to_string());
        let display = err.to_string();
        assert!(display.contains("fuzzy"));
        assert!(display.contains("fused"));
    }

    #[test]
    fn test_invalid_weight_error() {
        let err = ProtocolError::InvalidWeight(1.5);
        assert!(err.to_string().contains("1.5"));
    }
}
