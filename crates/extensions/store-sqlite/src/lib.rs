//! SQLite row store for starsearch.
//!
//! Persists starred repository metadata and answers id lookups and
//! case-insensitive substring queries.

mod backend;
mod schema;

pub use backend::SqliteRowStore;
