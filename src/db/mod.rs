// Database module

pub mod keyframes;
pub mod labels;
pub mod media;
pub mod migrations;
pub mod schema;

use std::path::{Path, PathBuf};

use rusqlite::Connection;

use crate::constants::DB_FILENAME;
use crate::error::{JliError, Result};

/// Open or create a database at the given path
pub fn open_db(db_path: &Path) -> Result<Connection> {
    let conn = Connection::open(db_path).map_err(|e| {
        JliError::StorageUnavailable(format!("cannot open {}: {}", db_path.display(), e))
    })?;

    // Other processes may hold the write lock
    conn.execute_batch("PRAGMA busy_timeout = 5000;")
        .map_err(JliError::classify)?;

    // WAL keeps a crash mid-write from corrupting the catalogue
    conn.execute_batch("PRAGMA journal_mode = WAL;")
        .map_err(JliError::classify)?;

    prepare_connection(conn)
}

/// Open a private in-memory database with the full schema (tests, dry runs)
pub fn open_in_memory() -> Result<Connection> {
    let conn = Connection::open_in_memory()?;
    prepare_connection(conn)
}

fn prepare_connection(conn: Connection) -> Result<Connection> {
    // Enable foreign keys (must be done per connection)
    conn.execute_batch("PRAGMA foreign_keys = ON;")?;

    migrations::run_migrations(&conn)?;

    Ok(conn)
}

/// Get the default database path for a media root
pub fn get_db_path(media_root: &Path) -> PathBuf {
    media_root.join(DB_FILENAME)
}

/// Current time at the millisecond precision the store persists.
pub(crate) fn now() -> chrono::DateTime<chrono::Utc> {
    use chrono::{SubsecRound, Utc};
    Utc::now().trunc_subsecs(3)
}

#[cfg(test)]
#[path = "tests.rs"]
mod tests;
