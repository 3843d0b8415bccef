//! Lexical index adapter over the row store.

use std::sync::Arc;

use tracing::debug;

use starsearch_protocols::{Candidate, RetrievalError, RowStore};

/// Keyword search delegated to the row store's substring query.
///
/// Results come back ordered by popularity (ties by ascending id) and carry
/// no similarity score.
#[derive(Clone)]
pub struct LexicalIndex {
    rows: Arc<dyn RowStore>,
}

impl LexicalIndex {
    pub fn new(rows: Arc<dyn RowStore>) -> Self {
        Self { rows }
    }

    pub async fn search(
        &self,
        keyword: &str,
        limit: usize,
    ) -> Result<Vec<Candidate>, RetrievalError> {
        let keyword = keyword.trim();
        if keyword.is_empty() || limit == 0 {
            return Ok(Vec::new());
        }

        let rows = self.rows.substring_query(keyword, limit).await?;
        debug!("Lexical search for {:?} matched {} rows", keyword, rows.len());

        Ok(rows.into_iter().take(limit).map(Candidate::lexical).collect())
    }
}
