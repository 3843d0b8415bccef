//! SQLite row store implementation.

use std::collections::HashMap;
use std::path::Path;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rusqlite::params;
use tokio_rusqlite::Connection;
use tracing::{debug, info};

use starsearch_protocols::{RepoMetadata, RepoRecord, RetrievalError, RowStore, RowStoreStats};

use crate::schema::init_schema;

#[path = "backend_search.rs"]
mod backend_search;
use backend_search::{fold_case, rows_by_ids, substring_rows};

#[cfg(test)]
#[path = "backend_tests.rs"]
mod tests;

/// SQLite-based row store.
pub struct SqliteRowStore {
    conn: Connection,
}

impl SqliteRowStore {
    /// Create a new in-memory database.
    pub async fn in_memory() -> Result<Self, RetrievalError> {
        let conn = Connection::open_in_memory().await.map_err(unavailable)?;

        conn.call(|conn| Ok(init_schema(conn)?))
            .await
            .map_err(unavailable)?;

        Ok(Self { conn })
    }

    /// Create a new file-backed database, creating parent directories.
    pub async fn open(path: impl AsRef<Path>) -> Result<Self, RetrievalError> {
        let path = path.as_ref().to_path_buf();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent)
                    .await
                    .map_err(|e| RetrievalError::Storage(e.to_string()))?;
            }
        }

        let conn = Connection::open(&path).await.map_err(unavailable)?;

        conn.call(|conn| Ok(init_schema(conn)?))
            .await
            .map_err(unavailable)?;

        debug!("Opened row store at {}", path.display());
        Ok(Self { conn })
    }
}

fn unavailable(e: tokio_rusqlite::Error) -> RetrievalError {
    RetrievalError::RowStoreUnavailable(e.to_string())
}

#[async_trait]
impl RowStore for SqliteRowStore {
    async fn replace_all(&self, records: Vec<RepoRecord>) -> Result<usize, RetrievalError> {
        let now = Utc::now().to_rfc3339();

        let written = self
            .conn
            .call(move |conn| {
                let tx = conn.transaction()?;
                tx.execute("DELETE FROM starred_repos", [])?;

                {
                    let mut stmt = tx.prepare(
                        "INSERT OR REPLACE INTO starred_repos (
                            id, full_name, name, owner, description, html_url, homepage,
                            language, topics, stargazers_count, updated_at, created_at,
                            starred_at, search_text, full_name_folded, description_folded,
                            sync_at
                         ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14,
                                   ?15, ?16, ?17)",
                    )?;
                    for record in &records {
                        let topics = serde_json::to_string(&record.topics)
                            .map_err(|e| rusqlite::Error::ToSqlConversionFailure(Box::new(e)))?;
                        let description_folded =
                            fold_case(record.description.as_deref().unwrap_or_default());
                        stmt.execute(params![
                            record.id,
                            record.full_name,
                            record.name,
                            record.owner,
                            record.description,
                            record.html_url,
                            record.homepage,
                            record.language,
                            topics,
                            record.stargazers_count,
                            record.updated_at,
                            record.created_at,
                            record.starred_at,
                            record.search_text(),
                            fold_case(&record.full_name),
                            description_folded,
                            now,
                        ])?;
                    }
                }

                let count: i64 =
                    tx.query_row("SELECT COUNT(*) FROM starred_repos", [], |row| row.get(0))?;
                tx.commit()?;
                Ok(count as usize)
            })
            .await
            .map_err(unavailable)?;

        info!("Replaced row store contents ({} repositories)", written);
        Ok(written)
    }

    async fn get_rows_by_ids(
        &self,
        ids: &[i64],
    ) -> Result<HashMap<i64, RepoMetadata>, RetrievalError> {
        if ids.is_empty() {
            return Ok(HashMap::new());
        }
        let ids = ids.to_vec();
        self.conn
            .call(move |conn| Ok(rows_by_ids(conn, &ids)?))
            .await
            .map_err(unavailable)
    }

    async fn substring_query(
        &self,
        keyword: &str,
        limit: usize,
    ) -> Result<Vec<RepoMetadata>, RetrievalError> {
        let needle = fold_case(keyword.trim());
        if needle.is_empty() || limit == 0 {
            return Ok(Vec::new());
        }
        self.conn
            .call(move |conn| Ok(substring_rows(conn, &needle, limit)?))
            .await
            .map_err(unavailable)
    }

    async fn stats(&self) -> Result<RowStoreStats, RetrievalError> {
        self.conn
            .call(|conn| {
                let (total, last): (i64, Option<String>) = conn.query_row(
                    "SELECT COUNT(*), MAX(sync_at) FROM starred_repos",
                    [],
                    |row| Ok((row.get(0)?, row.get(1)?)),
                )?;

                let last_sync = last
                    .and_then(|s| DateTime::parse_from_rfc3339(&s).ok())
                    .map(|dt| dt.with_timezone(&Utc));

                Ok(RowStoreStats {
                    total_rows: total as usize,
                    last_sync,
                })
            })
            .await
            .map_err(unavailable)
    }
}
