//! Query helpers for the SQLite row store.

use std::collections::HashMap;

use rusqlite::types::{Type, Value};
use rusqlite::{params_from_iter, Row};

use starsearch_protocols::RepoMetadata;

const COLUMNS: &str = "id, full_name, description, html_url, language, topics, stargazers_count";

/// Keeps `IN (...)` lists under SQLite's bound-parameter limit.
const MAX_BOUND_IDS: usize = 500;

/// Rows whose `full_name` or `description` contains `needle`.
///
/// SQLite's `lower()` only folds ASCII, so the folded columns are written
/// with [`fold_case`] at insert time and `needle` must be folded the same
/// way. `instr` does no pattern matching, so `%` and `_` in the keyword
/// match literally.
pub(crate) fn substring_rows(
    conn: &rusqlite::Connection,
    needle: &str,
    limit: usize,
) -> Result<Vec<RepoMetadata>, rusqlite::Error> {
    let sql = format!(
        "SELECT {COLUMNS} FROM starred_repos
         WHERE instr(full_name_folded, ?1) > 0
            OR instr(description_folded, ?1) > 0
         ORDER BY stargazers_count DESC, id ASC
         LIMIT ?2"
    );
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt
        .query_map(rusqlite::params![needle, sql_limit(limit)], metadata_from_row)?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(rows)
}

/// Unicode lowercase, shared by the stored haystack and the query needle.
pub(crate) fn fold_case(text: &str) -> String {
    text.to_lowercase()
}

/// `usize` limits beyond `i64::MAX` mean "no limit".
fn sql_limit(limit: usize) -> i64 {
    i64::try_from(limit).unwrap_or(i64::MAX)
}

pub(crate) fn rows_by_ids(
    conn: &rusqlite::Connection,
    ids: &[i64],
) -> Result<HashMap<i64, RepoMetadata>, rusqlite::Error> {
    let mut out = HashMap::with_capacity(ids.len());

    for chunk in ids.chunks(MAX_BOUND_IDS) {
        let placeholders = chunk.iter().map(|_| "?").collect::<Vec<_>>().join(",");
        let sql = format!("SELECT {COLUMNS} FROM starred_repos WHERE id IN ({placeholders})");

        let mut stmt = conn.prepare(&sql)?;
        let values = chunk.iter().map(|&id| Value::Integer(id));
        for row in stmt.query_map(params_from_iter(values), metadata_from_row)? {
            let meta = row?;
            out.insert(meta.entity_id, meta);
        }
    }
    Ok(out)
}

fn metadata_from_row(row: &Row<'_>) -> Result<RepoMetadata, rusqlite::Error> {
    let topics_str: String = row.get(5)?;
    let topics = serde_json::from_str(&topics_str)
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(5, Type::Text, Box::new(e)))?;
    Ok(RepoMetadata {
        entity_id: row.get(0)?,
        full_name: row.get(1)?,
        description: row.get(2)?,
        url: row.get(3)?,
        language: row.get(4)?,
        topics,
        popularity: row.get(6)?,
    })
}
