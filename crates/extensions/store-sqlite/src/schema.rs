//! Database schema management.

use rusqlite::Connection;
use tokio_rusqlite::Error;

/// Initialize the database schema.
pub fn init_schema(conn: &Connection) -> Result<(), Error> {
    conn.execute_batch(SCHEMA)?;
    Ok(())
}

const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS starred_repos (
    id INTEGER PRIMARY KEY,
    full_name TEXT NOT NULL,
    name TEXT NOT NULL,
    owner TEXT NOT NULL DEFAULT '',
    description TEXT,
    html_url TEXT NOT NULL,
    homepage TEXT,
    language TEXT,
    topics TEXT NOT NULL DEFAULT '[]',
    stargazers_count INTEGER NOT NULL DEFAULT 0,
    updated_at TEXT,
    created_at TEXT,
    starred_at TEXT,
    search_text TEXT NOT NULL,
    full_name_folded TEXT NOT NULL,
    description_folded TEXT NOT NULL DEFAULT '',
    sync_at TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_starred_repos_stars ON starred_repos(stargazers_count DESC, id ASC);
CREATE INDEX IF NOT EXISTS idx_starred_repos_language ON starred_repos(language);
"#;
