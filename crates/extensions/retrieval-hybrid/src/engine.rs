//! Retrieval facade: one `search` entry point over both indexes.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use starsearch_protocols::{
    Candidate, EmbeddingProvider, RetrievalError, RowStore, SearchMode,
};
use starsearch_store_vector::VectorStore;

use crate::fusion::{FusionConfig, DEFAULT_RRF_K};
use crate::lexical::LexicalIndex;

/// What fused mode does when the query cannot be embedded.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EmbeddingFailurePolicy {
    /// Surface `EmbeddingUnavailable`.
    #[default]
    Fail,
    /// Log a warning and answer from the lexical index alone.
    Degrade,
}

/// Configuration for the retrieval engine.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// RRF damping constant.
    pub rrf_k: u32,
    pub on_embedding_failure: EmbeddingFailurePolicy,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            rrf_k: DEFAULT_RRF_K,
            on_embedding_failure: EmbeddingFailurePolicy::Fail,
        }
    }
}

impl EngineConfig {
    pub fn rrf_k(mut self, k: u32) -> Self {
        self.rrf_k = k;
        self
    }

    pub fn on_embedding_failure(mut self, policy: EmbeddingFailurePolicy) -> Self {
        self.on_embedding_failure = policy;
        self
    }
}

/// Snapshot of what the engine currently serves.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineStatus {
    pub total_repos: usize,
    pub indexed_vectors: usize,
    pub generation: Option<u64>,
    pub dimension: usize,
    pub last_sync: Option<DateTime<Utc>>,
}

/// Hybrid retrieval engine.
///
/// Owns no data itself: the vector store, the row store and the embedding
/// provider are shared with the indexer that keeps them in sync.
pub struct RetrievalEngine {
    vectors: Arc<VectorStore>,
    rows: Arc<dyn RowStore>,
    lexical: LexicalIndex,
    embedder: Arc<dyn EmbeddingProvider>,
    config: EngineConfig,
}

impl RetrievalEngine {
    pub fn new(
        vectors: Arc<VectorStore>,
        rows: Arc<dyn RowStore>,
        embedder: Arc<dyn EmbeddingProvider>,
        config: EngineConfig,
    ) -> Self {
        Self {
            lexical: LexicalIndex::new(rows.clone()),
            vectors,
            rows,
            embedder,
            config,
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Answer `query` in the given mode with at most `limit` results.
    ///
    /// A blank query or a zero limit yields an empty result, not an error.
    pub async fn search(
        &self,
        query: &str,
        mode: SearchMode,
        limit: usize,
    ) -> Result<Vec<Candidate>, RetrievalError> {
        let query = query.trim();
        if query.is_empty() || limit == 0 {
            return Ok(Vec::new());
        }

        match mode {
            SearchMode::Vector => self.vector_search(query, limit).await,
            SearchMode::Lexical => self.lexical.search(query, limit).await,
            SearchMode::Fused { semantic_weight } => {
                self.fused_search(query, limit, semantic_weight).await
            }
        }
    }

    async fn fused_search(
        &self,
        query: &str,
        limit: usize,
        semantic_weight: f32,
    ) -> Result<Vec<Candidate>, RetrievalError> {
        let fetch = limit.saturating_mul(2);

        let (vector, lexical) = tokio::join!(
            self.vector_search(query, fetch),
            self.lexical.search(query, fetch)
        );
        let lexical = lexical?;

        let vector = match vector {
            Ok(hits) => hits,
            Err(RetrievalError::EmbeddingUnavailable(reason))
                if self.config.on_embedding_failure == EmbeddingFailurePolicy::Degrade =>
            {
                warn!(
                    "Embedding unavailable ({}), answering fused query from lexical index only",
                    reason
                );
                return Ok(lexical.into_iter().take(limit).collect());
            }
            Err(e) => return Err(e),
        };

        debug!(
            "Fusing {} vector and {} lexical candidates (weight {})",
            vector.len(),
            lexical.len(),
            semantic_weight
        );

        Ok(FusionConfig::new(semantic_weight, self.config.rrf_k).fuse(vector, lexical, limit))
    }

    /// Embed the query and return the nearest rows, hydrated with metadata.
    async fn vector_search(
        &self,
        query: &str,
        k: usize,
    ) -> Result<Vec<Candidate>, RetrievalError> {
        // Pin the generation before doing any work against it.
        let snapshot = self.vectors.snapshot()?;

        let embedding = self.embedder.embed(query).await?;
        let hits = snapshot.top_k(&embedding.vector, k)?;
        if hits.is_empty() {
            return Ok(Vec::new());
        }

        let ids: Vec<i64> = hits.iter().map(|h| h.entity_id).collect();
        let mut rows: HashMap<_, _> = self.rows.get_rows_by_ids(&ids).await?;

        let mut candidates = Vec::with_capacity(hits.len());
        for hit in hits {
            match rows.remove(&hit.entity_id) {
                Some(metadata) => candidates.push(Candidate::vector(metadata, hit.similarity)),
                None => warn!(
                    "Vector id {} (generation {}) has no metadata row, skipping",
                    hit.entity_id,
                    snapshot.generation()
                ),
            }
        }

        debug!("Vector search returned {} candidates", candidates.len());
        Ok(candidates)
    }

    pub async fn status(&self) -> Result<EngineStatus, RetrievalError> {
        let stats = self.rows.stats().await?;
        Ok(EngineStatus {
            total_repos: stats.total_rows,
            indexed_vectors: self.vectors.len(),
            generation: self.vectors.generation(),
            dimension: self.vectors.dimension(),
            last_sync: stats.last_sync,
        })
    }
}

#[cfg(test)]
#[path = "engine_tests.rs"]
mod tests;
