// Label queries: global find-or-create, prefix search and associations

use rusqlite::{params, Connection, OptionalExtension};

use super::schema::{map_label, Label};
use crate::constants::LABEL_SEARCH_LIMIT;
use crate::error::{JliError, Result};

pub fn get_label(conn: &Connection, id: i64) -> Result<Option<Label>> {
    let result = conn
        .query_row(
            "SELECT id, name FROM labels WHERE id = ?1",
            params![id],
            map_label,
        )
        .optional()?;
    Ok(result)
}

pub fn get_label_by_name(conn: &Connection, name: &str) -> Result<Option<Label>> {
    let result = conn
        .query_row(
            "SELECT id, name FROM labels WHERE name = ?1",
            params![name],
            map_label,
        )
        .optional()?;
    Ok(result)
}

/// Return the label with exactly this name (case-sensitive), creating it on first use.
pub fn find_or_create_label(conn: &Connection, name: &str) -> Result<Label> {
    if let Some(label) = get_label_by_name(conn, name)? {
        return Ok(label);
    }
    insert_label_or_read(conn, name)
}

/// Insert a label, falling back to a read when the name already exists.
fn insert_label_or_read(conn: &Connection, name: &str) -> Result<Label> {
    match conn.execute("INSERT INTO labels (name) VALUES (?1)", params![name]) {
        Ok(_) => Ok(Label {
            id: conn.last_insert_rowid(),
            name: name.to_string(),
        }),
        // Someone else created it between our read and write
        Err(e) if JliError::is_unique_violation(&e) => {
            log::debug!("Label {:?} created concurrently, reading it back", name);
            get_label_by_name(conn, name)?.ok_or_else(|| {
                JliError::ConstraintViolation(format!("label {:?} conflicted but is missing", name))
            })
        }
        Err(e) => Err(JliError::classify(e)),
    }
}

/// Labels whose name starts with `query`, case-sensitive, ordered by name, at most ten.
/// An empty query matches nothing.
pub fn search_labels(conn: &Connection, query: &str) -> Result<Vec<Label>> {
    if query.is_empty() {
        return Ok(Vec::new());
    }

    let mut stmt = conn.prepare(
        "SELECT id, name FROM labels
         WHERE substr(name, 1, length(?1)) = ?1
         ORDER BY name ASC
         LIMIT ?2",
    )?;

    let labels = stmt
        .query_map(params![query, LABEL_SEARCH_LIMIT], map_label)?
        .collect::<std::result::Result<Vec<_>, _>>()?;
    Ok(labels)
}

fn require_row(conn: &Connection, sql: &str, id: i64, entity: &'static str) -> Result<()> {
    let found: Option<i64> = conn.query_row(sql, params![id], |row| row.get(0)).optional()?;
    match found {
        Some(_) => Ok(()),
        None => Err(JliError::not_found(entity, id)),
    }
}

fn require_label(conn: &Connection, label_id: i64) -> Result<()> {
    require_row(conn, "SELECT id FROM labels WHERE id = ?1", label_id, "Label")
}

// ----- Media file associations -----

/// Attach a label to a media file. Attaching twice is a no-op.
pub fn add_media_label(conn: &Connection, media_file_id: i64, label_id: i64) -> Result<()> {
    require_row(
        conn,
        "SELECT id FROM media_files WHERE id = ?1",
        media_file_id,
        "Media file",
    )?;
    require_label(conn, label_id)?;

    conn.execute(
        "INSERT INTO media_labels (media_file_id, label_id) VALUES (?1, ?2)
         ON CONFLICT DO NOTHING",
        params![media_file_id, label_id],
    )
    .map_err(JliError::classify)?;
    Ok(())
}

/// Detach a label from a media file. Missing associations are ignored.
pub fn remove_media_label(conn: &Connection, media_file_id: i64, label_id: i64) -> Result<()> {
    conn.execute(
        "DELETE FROM media_labels WHERE media_file_id = ?1 AND label_id = ?2",
        params![media_file_id, label_id],
    )?;
    Ok(())
}

pub fn labels_for_media_file(conn: &Connection, media_file_id: i64) -> Result<Vec<Label>> {
    let mut stmt = conn.prepare(
        "SELECT l.id, l.name FROM labels l
         JOIN media_labels ml ON ml.label_id = l.id
         WHERE ml.media_file_id = ?1
         ORDER BY l.name ASC",
    )?;

    let labels = stmt
        .query_map(params![media_file_id], map_label)?
        .collect::<std::result::Result<Vec<_>, _>>()?;
    Ok(labels)
}

// ----- Keyframe associations -----

/// Attach a label to a keyframe. Attaching twice is a no-op.
pub fn add_keyframe_label(conn: &Connection, keyframe_id: i64, label_id: i64) -> Result<()> {
    require_row(
        conn,
        "SELECT id FROM keyframes WHERE id = ?1",
        keyframe_id,
        "Keyframe",
    )?;
    require_label(conn, label_id)?;

    conn.execute(
        "INSERT INTO keyframe_labels (keyframe_id, label_id) VALUES (?1, ?2)
         ON CONFLICT DO NOTHING",
        params![keyframe_id, label_id],
    )
    .map_err(JliError::classify)?;
    Ok(())
}

/// Detach a label from a keyframe. Missing associations are ignored.
pub fn remove_keyframe_label(conn: &Connection, keyframe_id: i64, label_id: i64) -> Result<()> {
    conn.execute(
        "DELETE FROM keyframe_labels WHERE keyframe_id = ?1 AND label_id = ?2",
        params![keyframe_id, label_id],
    )?;
    Ok(())
}

pub fn labels_for_keyframe(conn: &Connection, keyframe_id: i64) -> Result<Vec<Label>> {
    let mut stmt = conn.prepare(
        "SELECT l.id, l.name FROM labels l
         JOIN keyframe_labels kl ON kl.label_id = l.id
         WHERE kl.keyframe_id = ?1
         ORDER BY l.name ASC",
    )?;

    let labels = stmt
        .query_map(params![keyframe_id], map_label)?
        .collect::<std::result::Result<Vec<_>, _>>()?;
    Ok(labels)
}
