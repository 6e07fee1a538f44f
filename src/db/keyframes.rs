// Keyframe queries
//
// Every video/audio file carries exactly one pinned keyframe at 0 ms. It is created
// lazily on first access and can never be moved or deleted; its description stays
// editable. All other keyframes are free-form.

use rusqlite::{params, Connection, OptionalExtension};

use super::labels::labels_for_keyframe;
use super::media::get_media_file;
use super::schema::{map_keyframe, Keyframe, KEYFRAME_COLUMNS};
use crate::constants::PINNED_TIMESTAMP_MS;
use crate::error::{JliError, Result};

const ENTITY: &str = "Keyframe";

/// Only video and audio files may own keyframes.
fn require_temporal_file(conn: &Connection, media_file_id: i64) -> Result<()> {
    let file = get_media_file(conn, media_file_id)?
        .ok_or_else(|| JliError::not_found("Media file", media_file_id))?;
    if !file.media_type.is_temporal() {
        return Err(JliError::NotTemporal(media_file_id));
    }
    Ok(())
}

/// Pinned flag of a keyframe, or None if it does not exist.
fn keyframe_pinned(conn: &Connection, id: i64) -> Result<Option<bool>> {
    let pinned = conn
        .query_row(
            "SELECT pinned FROM keyframes WHERE id = ?1",
            params![id],
            |row| row.get(0),
        )
        .optional()?;
    Ok(pinned)
}

/// Reject missing and pinned keyframes before a move or delete.
fn require_unpinned(conn: &Connection, id: i64) -> Result<()> {
    match keyframe_pinned(conn, id)? {
        None => Err(JliError::not_found(ENTITY, id)),
        Some(true) => Err(JliError::PinnedKeyframe(id)),
        Some(false) => Ok(()),
    }
}

/// Create the pinned 0 ms keyframe for a file if it does not have one yet.
/// Returns true when the keyframe was created by this call.
pub fn ensure_pinned_keyframe(conn: &Connection, media_file_id: i64) -> Result<bool> {
    require_temporal_file(conn, media_file_id)?;

    // idx_keyframes_one_pinned turns a second pinned insert into a no-op
    let inserted = conn
        .execute(
            "INSERT OR IGNORE INTO keyframes (media_file_id, timestamp_ms, pinned)
             VALUES (?1, ?2, 1)",
            params![media_file_id, PINNED_TIMESTAMP_MS],
        )
        .map_err(JliError::classify)?;

    if inserted > 0 {
        log::debug!("Created pinned keyframe for media file {}", media_file_id);
    }
    Ok(inserted > 0)
}

pub fn get_keyframe(conn: &Connection, id: i64) -> Result<Option<Keyframe>> {
    let keyframe = conn
        .query_row(
            &format!("SELECT {} FROM keyframes WHERE id = ?1", KEYFRAME_COLUMNS),
            params![id],
            map_keyframe,
        )
        .optional()?;

    match keyframe {
        Some(mut kf) => {
            kf.labels = labels_for_keyframe(conn, kf.id)?;
            Ok(Some(kf))
        }
        None => Ok(None),
    }
}

/// Add an unpinned keyframe. Several keyframes may share a timestamp.
pub fn create_keyframe(conn: &Connection, media_file_id: i64, timestamp_ms: i64) -> Result<Keyframe> {
    require_temporal_file(conn, media_file_id)?;

    conn.execute(
        "INSERT INTO keyframes (media_file_id, timestamp_ms, pinned) VALUES (?1, ?2, 0)",
        params![media_file_id, timestamp_ms],
    )
    .map_err(JliError::classify)?;

    let id = conn.last_insert_rowid();
    get_keyframe(conn, id)?.ok_or_else(|| JliError::not_found(ENTITY, id))
}

/// All keyframes of a file ordered by timestamp, each with its labels.
pub fn keyframes_for_media_file(conn: &Connection, media_file_id: i64) -> Result<Vec<Keyframe>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {} FROM keyframes WHERE media_file_id = ?1 ORDER BY timestamp_ms ASC, id ASC",
        KEYFRAME_COLUMNS
    ))?;

    let mut keyframes = stmt
        .query_map(params![media_file_id], map_keyframe)?
        .collect::<std::result::Result<Vec<_>, _>>()?;

    for kf in keyframes.iter_mut() {
        kf.labels = labels_for_keyframe(conn, kf.id)?;
    }

    Ok(keyframes)
}

/// Move a keyframe. Pinned keyframes are rejected.
pub fn update_keyframe_timestamp(conn: &Connection, id: i64, timestamp_ms: i64) -> Result<()> {
    require_unpinned(conn, id)?;

    conn.execute(
        "UPDATE keyframes SET timestamp_ms = ?1 WHERE id = ?2",
        params![timestamp_ms, id],
    )
    .map_err(JliError::classify)?;
    Ok(())
}

/// Replace a keyframe's description. Allowed on pinned keyframes.
pub fn update_keyframe_description(conn: &Connection, id: i64, description: &str) -> Result<()> {
    let rows = conn.execute(
        "UPDATE keyframes SET description = ?1 WHERE id = ?2",
        params![description, id],
    )?;
    if rows == 0 {
        return Err(JliError::not_found(ENTITY, id));
    }
    Ok(())
}

/// Delete a keyframe and its label associations. Pinned keyframes are rejected.
pub fn delete_keyframe(conn: &Connection, id: i64) -> Result<()> {
    require_unpinned(conn, id)?;

    conn.execute("DELETE FROM keyframes WHERE id = ?1", params![id])?;
    Ok(())
}
