//! Collaborator stubs shared by the unit tests.

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;

use starsearch_protocols::{
    Embedding, EmbeddingError, EmbeddingProvider, RepoMetadata, RepoRecord, RetrievalError,
    RowStore, RowStoreStats,
};
use starsearch_store_sqlite::SqliteRowStore;
use starsearch_store_vector::VectorStore;

use crate::indexer::Indexer;

/// Returns a fixed vector per text, or `fallback` for unknown text.
pub struct StubEmbedder {
    pub fallback: Vec<f32>,
    pub by_text: HashMap<String, Vec<f32>>,
    pub calls: AtomicUsize,
}

impl StubEmbedder {
    pub fn new(fallback: Vec<f32>) -> Self {
        Self {
            fallback,
            by_text: HashMap::new(),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl EmbeddingProvider for StubEmbedder {
    async fn embed(&self, text: &str) -> Result<Embedding, EmbeddingError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let vector = self.by_text.get(text).unwrap_or(&self.fallback).clone();
        Ok(Embedding::new(vector))
    }

    async fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Embedding>, EmbeddingError> {
        let mut out = Vec::with_capacity(texts.len());
        for text in texts {
            out.push(self.embed(text).await?);
        }
        Ok(out)
    }

    fn dimension(&self) -> usize {
        self.fallback.len()
    }
}

/// Every call fails, as an unreachable model server would.
pub struct FailingEmbedder;

#[async_trait]
impl EmbeddingProvider for FailingEmbedder {
    async fn embed(&self, _text: &str) -> Result<Embedding, EmbeddingError> {
        Err(EmbeddingError::Failed("connection refused".to_string()))
    }

    async fn embed_batch(&self, _texts: &[&str]) -> Result<Vec<Embedding>, EmbeddingError> {
        Err(EmbeddingError::Failed("connection refused".to_string()))
    }

    fn dimension(&self) -> usize {
        2
    }
}

/// Every call fails, as a locked or missing database would.
pub struct FailingRowStore;

#[async_trait]
impl RowStore for FailingRowStore {
    async fn replace_all(&self, _records: Vec<RepoRecord>) -> Result<usize, RetrievalError> {
        Err(RetrievalError::RowStoreUnavailable("database is locked".to_string()))
    }

    async fn get_rows_by_ids(
        &self,
        _ids: &[i64],
    ) -> Result<HashMap<i64, RepoMetadata>, RetrievalError> {
        Err(RetrievalError::RowStoreUnavailable("database is locked".to_string()))
    }

    async fn substring_query(
        &self,
        _keyword: &str,
        _limit: usize,
    ) -> Result<Vec<RepoMetadata>, RetrievalError> {
        Err(RetrievalError::RowStoreUnavailable("database is locked".to_string()))
    }

    async fn stats(&self) -> Result<RowStoreStats, RetrievalError> {
        Err(RetrievalError::RowStoreUnavailable("database is locked".to_string()))
    }
}

/// Unit vector in 2-D with the given cosine to `[1, 0]`.
pub fn at_similarity(cos: f32) -> Embedding {
    Embedding::new(vec![cos, (1.0 - cos * cos).max(0.0).sqrt()])
}

/// Stores seeded with the A..E fixture.
///
/// Query vector `[1, 0]`. Similarities: A 0.9, D 0.8, E 0.7, B 0.5, C 0.1.
/// Only B and C mention "graph"; B is more popular.
pub async fn seeded_stores() -> (Arc<VectorStore>, Arc<SqliteRowStore>) {
    let vectors = Arc::new(VectorStore::in_memory(2));
    let rows = Arc::new(SqliteRowStore::in_memory().await.unwrap());

    let records = vec![
        RepoRecord::new(1, "x/alpha").with_description("fast parser").with_stars(10),
        RepoRecord::new(2, "x/beta").with_description("graph library").with_stars(300),
        RepoRecord::new(3, "x/gamma").with_description("graph tool").with_stars(200),
        RepoRecord::new(4, "x/delta").with_description("http client").with_stars(5),
        RepoRecord::new(5, "x/epsilon").with_description("logger").with_stars(1),
    ];
    let embeddings = vec![
        at_similarity(0.9),
        at_similarity(0.5),
        at_similarity(0.1),
        at_similarity(0.8),
        at_similarity(0.7),
    ];

    Indexer::new(vectors.clone(), rows.clone(), Arc::new(FailingEmbedder))
        .load_precomputed(records, embeddings)
        .await
        .unwrap();

    (vectors, rows)
}
