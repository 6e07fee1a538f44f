// Database migrations
// Migrations are forward-only. Never edit or delete a migration after it ships.

use rusqlite::Connection;

use crate::error::{JliError, Result};

/// All migrations in order. Each migration is a SQL string.
const MIGRATIONS: &[&str] = &[
    // Migration 1: Initial schema
    r#"
    CREATE TABLE media_files (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        path TEXT NOT NULL UNIQUE,
        media_type TEXT NOT NULL CHECK (media_type IN ('image', 'video', 'audio')),
        description TEXT NOT NULL DEFAULT '',
        created_at TEXT NOT NULL,
        updated_at TEXT NOT NULL
    );

    CREATE TABLE labels (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        name TEXT NOT NULL UNIQUE
    );

    CREATE TABLE media_labels (
        media_file_id INTEGER NOT NULL REFERENCES media_files(id) ON DELETE CASCADE,
        label_id INTEGER NOT NULL REFERENCES labels(id) ON DELETE CASCADE,
        PRIMARY KEY (media_file_id, label_id)
    );

    CREATE TABLE keyframes (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        media_file_id INTEGER NOT NULL REFERENCES media_files(id) ON DELETE CASCADE,
        timestamp_ms INTEGER NOT NULL CHECK (timestamp_ms >= 0),
        description TEXT NOT NULL DEFAULT '',
        pinned INTEGER NOT NULL DEFAULT 0 CHECK (pinned IN (0, 1))
    );

    CREATE TABLE keyframe_labels (
        keyframe_id INTEGER NOT NULL REFERENCES keyframes(id) ON DELETE CASCADE,
        label_id INTEGER NOT NULL REFERENCES labels(id) ON DELETE CASCADE,
        PRIMARY KEY (keyframe_id, label_id)
    );
    "#,

    // Migration 2: Lookup indexes, one pinned keyframe per file
    r#"
    CREATE INDEX idx_keyframes_media_file ON keyframes(media_file_id, timestamp_ms);
    CREATE UNIQUE INDEX idx_keyframes_one_pinned ON keyframes(media_file_id) WHERE pinned = 1;
    CREATE INDEX idx_media_labels_label ON media_labels(label_id);
    CREATE INDEX idx_keyframe_labels_label ON keyframe_labels(label_id);
    "#,
];

/// Latest schema version this build knows about.
pub fn target_version() -> u32 {
    MIGRATIONS.len() as u32
}

/// Get current schema version from database
pub fn get_schema_version(conn: &Connection) -> Result<u32> {
    let version: u32 = conn.query_row("PRAGMA user_version", [], |row| row.get(0))?;
    Ok(version)
}

/// Run all pending migrations
pub fn run_migrations(conn: &Connection) -> Result<()> {
    apply_migrations(conn, MIGRATIONS)
}

/// Apply every migration above the stored version inside one transaction.
/// Any failure rolls back all steps and leaves `user_version` untouched.
pub(crate) fn apply_migrations(conn: &Connection, migrations: &[&str]) -> Result<()> {
    let current_version = get_schema_version(conn)?;
    let target_version = migrations.len() as u32;

    // Refuse to open a DB created by a newer build
    if current_version > target_version {
        return Err(JliError::StorageUnavailable(format!(
            "database schema version {} is newer than this build supports (max {})",
            current_version, target_version
        )));
    }

    if current_version == target_version {
        return Ok(());
    }

    let tx = conn.unchecked_transaction()?;

    for (i, migration) in migrations.iter().enumerate() {
        let migration_version = (i + 1) as u32;
        if migration_version <= current_version {
            continue;
        }

        tx.execute_batch(migration).map_err(|e| {
            JliError::StorageUnavailable(format!("migration {} failed: {}", migration_version, e))
        })?;
        log::debug!("Staged migration {}", migration_version);
    }

    tx.pragma_update(None, "user_version", target_version)?;
    tx.commit()?;

    log::info!(
        "Migrated database schema from version {} to {}",
        current_version,
        target_version
    );

    Ok(())
}
