//! Index generation: keeps the row store and the vector store in step.

use std::collections::HashMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use starsearch_protocols::embedding::l2_norm;
use starsearch_protocols::{Embedding, EmbeddingProvider, RepoRecord, RetrievalError, RowStore};
use starsearch_store_vector::VectorStore;

/// Default number of texts per embedding request.
pub const DEFAULT_BATCH_SIZE: usize = 32;

/// Outcome of a successful sync.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SyncReport {
    pub generation: u64,
    pub repos: usize,
    pub dimension: usize,
}

/// Rebuilds both stores from a full list of repositories.
pub struct Indexer {
    vectors: Arc<VectorStore>,
    rows: Arc<dyn RowStore>,
    embedder: Arc<dyn EmbeddingProvider>,
    batch_size: usize,
}

impl Indexer {
    pub fn new(
        vectors: Arc<VectorStore>,
        rows: Arc<dyn RowStore>,
        embedder: Arc<dyn EmbeddingProvider>,
    ) -> Self {
        Self {
            vectors,
            rows,
            embedder,
            batch_size: DEFAULT_BATCH_SIZE,
        }
    }

    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size.max(1);
        self
    }

    /// Embed every record and publish a new index generation.
    ///
    /// Records sharing an id collapse to the last one. Every vector is
    /// checked before either store is touched, so an embedding failure
    /// leaves the previous generation serving.
    pub async fn sync(&self, records: Vec<RepoRecord>) -> Result<SyncReport, RetrievalError> {
        let records = dedupe(records);
        let texts: Vec<String> = records.iter().map(RepoRecord::search_text).collect();

        let mut embeddings = Vec::with_capacity(records.len());
        for (batch_no, batch) in texts.chunks(self.batch_size).enumerate() {
            let refs: Vec<&str> = batch.iter().map(String::as_str).collect();
            let vectors = self.embedder.embed_batch(&refs).await?;
            if vectors.len() != refs.len() {
                return Err(RetrievalError::EmbeddingUnavailable(format!(
                    "batch {} returned {} vectors for {} texts",
                    batch_no,
                    vectors.len(),
                    refs.len()
                )));
            }
            debug!("Embedded batch {} ({} texts)", batch_no, refs.len());
            embeddings.extend(vectors);
        }

        self.publish(records, embeddings).await
    }

    /// Publish a generation from vectors computed elsewhere.
    ///
    /// `vectors[i]` belongs to `records[i]`.
    pub async fn load_precomputed(
        &self,
        records: Vec<RepoRecord>,
        vectors: Vec<Embedding>,
    ) -> Result<SyncReport, RetrievalError> {
        if records.len() != vectors.len() {
            return Err(RetrievalError::LengthMismatch {
                ids: records.len(),
                rows: vectors.len(),
            });
        }

        let mut slots: HashMap<i64, usize> = HashMap::new();
        let mut pairs: Vec<(RepoRecord, Embedding)> = Vec::with_capacity(records.len());
        for pair in records.into_iter().zip(vectors) {
            match slots.get(&pair.0.id) {
                Some(&slot) => pairs[slot] = pair,
                None => {
                    slots.insert(pair.0.id, pairs.len());
                    pairs.push(pair);
                }
            }
        }
        let (records, vectors): (Vec<_>, Vec<_>) = pairs.into_iter().unzip();

        self.publish(records, vectors).await
    }

    async fn publish(
        &self,
        records: Vec<RepoRecord>,
        vectors: Vec<Embedding>,
    ) -> Result<SyncReport, RetrievalError> {
        let dimension = self.vectors.dimension();
        for (record, embedding) in records.iter().zip(&vectors) {
            if embedding.vector.len() != dimension {
                return Err(RetrievalError::DimensionMismatch {
                    expected: dimension,
                    actual: embedding.vector.len(),
                });
            }
            let norm = l2_norm(&embedding.vector);
            if norm == 0.0 || !norm.is_finite() {
                return Err(RetrievalError::InvalidVector {
                    entity_id: record.id,
                    reason: "vector has zero or non-finite norm".to_string(),
                });
            }
        }

        let ids: Vec<i64> = records.iter().map(|r| r.id).collect();
        let repos = self.rows.replace_all(records).await?;
        let generation = self.vectors.replace_all(ids, vectors)?;

        info!(
            "Index generation {} published: {} repositories, dimension {}",
            generation, repos, dimension
        );

        Ok(SyncReport {
            generation,
            repos,
            dimension,
        })
    }
}

/// Keep the last record for each id, in first-seen order.
fn dedupe(records: Vec<RepoRecord>) -> Vec<RepoRecord> {
    let mut slots: HashMap<i64, usize> = HashMap::new();
    let mut out: Vec<RepoRecord> = Vec::with_capacity(records.len());
    for record in records {
        match slots.get(&record.id) {
            Some(&slot) => out[slot] = record,
            None => {
                slots.insert(record.id, out.len());
                out.push(record);
            }
        }
    }
    out
}

#[cfg(test)]
#[path = "indexer_tests.rs"]
mod tests;
