//! Row store protocol definitions.
//!
//! The row store owns repository metadata. The engine reads it by id and
//! through a substring query, and replaces it wholesale on every sync.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::RetrievalError;
use crate::types::{RepoMetadata, RepoRecord};

/// Core trait for metadata row stores.
#[async_trait]
pub trait RowStore: Send + Sync {
    /// Replace every row with `records`. Returns the number of rows written.
    async fn replace_all(&self, records: Vec<RepoRecord>) -> Result<usize, RetrievalError>;

    /// Look up rows by id. Unknown ids are simply absent from the map.
    async fn get_rows_by_ids(
        &self,
        ids: &[i64],
    ) -> Result<HashMap<i64, RepoMetadata>, RetrievalError>;

    /// Case-insensitive substring match over name and description,
    /// ordered by popularity descending then id ascending.
    async fn substring_query(
        &self,
        keyword: &str,
        limit: usize,
    ) -> Result<Vec<RepoMetadata>, RetrievalError>;

    /// Row count and time of the last wholesale replace.
    async fn stats(&self) -> Result<RowStoreStats, RetrievalError>;
}

/// Summary of the row store contents.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RowStoreStats {
    pub total_rows: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_sync: Option<DateTime<Utc>>,
}
