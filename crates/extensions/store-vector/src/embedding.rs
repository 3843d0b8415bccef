//! Offline embedding provider.

use async_trait::async_trait;

use starsearch_protocols::embedding::normalize_in_place;
use starsearch_protocols::{Embedding, EmbeddingError, EmbeddingProvider};

/// Signed feature-hashing embedding.
///
/// Each lowercase alphanumeric token lands in one bucket with a sign taken
/// from the same hash, and the result is L2-normalized. Texts sharing
/// tokens get positive cosine similarity. Not semantic; meant for offline
/// use and tests. The hash is FNV-1a so vectors stay stable across builds
/// and a persisted index remains queryable.
pub struct SimpleHashEmbedding {
    dimension: usize,
}

impl SimpleHashEmbedding {
    pub fn new(dimension: usize) -> Self {
        Self { dimension }
    }

    fn hash_text(&self, text: &str) -> Result<Embedding, EmbeddingError> {
        if self.dimension == 0 {
            return Err(EmbeddingError::InvalidInput(
                "embedding dimension must be positive".to_string(),
            ));
        }

        let mut vector = vec![0.0f32; self.dimension];
        for token in tokens(text) {
            let hash = fnv1a(token.as_bytes());
            let bucket = (hash % self.dimension as u64) as usize;
            let sign = if (hash >> 63) & 1 == 0 { 1.0 } else { -1.0 };
            vector[bucket] += sign;
        }

        if !normalize_in_place(&mut vector) {
            return Err(EmbeddingError::InvalidInput(format!(
                "no indexable tokens in {:?}",
                text
            )));
        }

        Ok(Embedding::new(vector))
    }
}

impl Default for SimpleHashEmbedding {
    fn default() -> Self {
        Self::new(256)
    }
}

#[async_trait]
impl EmbeddingProvider for SimpleHashEmbedding {
    async fn embed(&self, text: &str) -> Result<Embedding, EmbeddingError> {
        self.hash_text(text)
    }

    async fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Embedding>, EmbeddingError> {
        texts.iter().map(|t| self.hash_text(t)).collect()
    }

    fn dimension(&self) -> usize {
        self.dimension
    }
}

fn tokens(text: &str) -> impl Iterator<Item = String> + '_ {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|t| !t.is_empty())
        .map(|t| t.to_lowercase())
}

pub(crate) fn fnv1a(bytes: &[u8]) -> u64 {
    const OFFSET: u64 = 0xcbf2_9ce4_8422_2325;
    const PRIME: u64 = 0x0000_0100_0000_01b3;
    bytes
        .iter()
        .fold(OFFSET, |hash, &b| (hash ^ b as u64).wrapping_mul(PRIME))
}

#[cfg(test)]
#[path = "embedding_tests.rs"]
mod tests;
