// Media file queries: idempotent upsert, lookup and path-ordered navigation

use rusqlite::{params, Connection, OptionalExtension};

use super::now;
use super::schema::{map_media_file, MediaFile, MediaType, Navigation, MEDIA_FILE_COLUMNS};
use crate::error::{JliError, Result};

const ENTITY: &str = "Media file";

/// Insert a file record unless `path` is already known.
/// Rediscovery is a no-op: the stored type and description are preserved.
/// Returns true when a new record was created.
pub fn upsert_media_file(conn: &Connection, path: &str, media_type: MediaType) -> Result<bool> {
    let ts = now();
    let inserted = conn
        .execute(
            "INSERT INTO media_files (path, media_type, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?3)
             ON CONFLICT (path) DO NOTHING",
            params![path, media_type, ts],
        )
        .map_err(JliError::classify)?;
    Ok(inserted > 0)
}

pub fn get_media_file(conn: &Connection, id: i64) -> Result<Option<MediaFile>> {
    let result = conn
        .query_row(
            &format!("SELECT {} FROM media_files WHERE id = ?1", MEDIA_FILE_COLUMNS),
            params![id],
            map_media_file,
        )
        .optional()?;
    Ok(result)
}

pub fn get_media_file_by_path(conn: &Connection, path: &str) -> Result<Option<MediaFile>> {
    let result = conn
        .query_row(
            &format!("SELECT {} FROM media_files WHERE path = ?1", MEDIA_FILE_COLUMNS),
            params![path],
            map_media_file,
        )
        .optional()?;
    Ok(result)
}

/// The file with the lexically smallest path, if any.
pub fn first_media_file(conn: &Connection) -> Result<Option<MediaFile>> {
    let result = conn
        .query_row(
            &format!(
                "SELECT {} FROM media_files ORDER BY path ASC LIMIT 1",
                MEDIA_FILE_COLUMNS
            ),
            [],
            map_media_file,
        )
        .optional()?;
    Ok(result)
}

pub fn count_media_files(conn: &Connection) -> Result<i64> {
    let count: i64 = conn.query_row("SELECT COUNT(*) FROM media_files", [], |row| row.get(0))?;
    Ok(count)
}

pub fn list_media_files(conn: &Connection, limit: i64, offset: i64) -> Result<Vec<MediaFile>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {} FROM media_files ORDER BY path ASC LIMIT ?1 OFFSET ?2",
        MEDIA_FILE_COLUMNS
    ))?;

    let files = stmt
        .query_map(params![limit, offset], map_media_file)?
        .collect::<std::result::Result<Vec<_>, _>>()?;
    Ok(files)
}

/// Replace a file's description and advance `updated_at`.
pub fn update_description(conn: &Connection, id: i64, description: &str) -> Result<()> {
    // MAX keeps updated_at monotonic if the wall clock steps backwards
    let rows = conn.execute(
        "UPDATE media_files SET description = ?1, updated_at = MAX(?2, updated_at) WHERE id = ?3",
        params![description, now(), id],
    )?;
    if rows == 0 {
        return Err(JliError::not_found(ENTITY, id));
    }
    Ok(())
}

/// Remove a file record. Keyframes and label associations cascade; labels stay.
pub fn delete_media_file(conn: &Connection, id: i64) -> Result<()> {
    let rows = conn.execute("DELETE FROM media_files WHERE id = ?1", params![id])?;
    if rows == 0 {
        return Err(JliError::not_found(ENTITY, id));
    }
    Ok(())
}

/// Neighbours and rank of a file in path order, treating the catalogue as circular.
pub fn get_navigation(conn: &Connection, id: i64) -> Result<Navigation> {
    let current_path: String = conn
        .query_row(
            "SELECT path FROM media_files WHERE id = ?1",
            params![id],
            |row| row.get(0),
        )
        .optional()?
        .ok_or_else(|| JliError::not_found(ENTITY, id))?;

    let total = count_media_files(conn)?;

    let index: i64 = conn.query_row(
        "SELECT COUNT(*) FROM media_files WHERE path <= ?1",
        params![current_path],
        |row| row.get(0),
    )?;

    let prev_id = match conn
        .query_row(
            "SELECT id FROM media_files WHERE path < ?1 ORDER BY path DESC LIMIT 1",
            params![current_path],
            |row| row.get(0),
        )
        .optional()?
    {
        Some(prev) => prev,
        // Wrap to the last file
        None => conn.query_row(
            "SELECT id FROM media_files ORDER BY path DESC LIMIT 1",
            [],
            |row| row.get(0),
        )?,
    };

    let next_id = match conn
        .query_row(
            "SELECT id FROM media_files WHERE path > ?1 ORDER BY path ASC LIMIT 1",
            params![current_path],
            |row| row.get(0),
        )
        .optional()?
    {
        Some(next) => next,
        // Wrap to the first file
        None => conn.query_row(
            "SELECT id FROM media_files ORDER BY path ASC LIMIT 1",
            [],
            |row| row.get(0),
        )?,
    };

    Ok(Navigation {
        prev_id,
        next_id,
        index,
        total,
    })
}
