// Database schema types and row mappers

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use rusqlite::types::{FromSql, FromSqlError, FromSqlResult, ToSql, ToSqlOutput, ValueRef};
use serde::{Deserialize, Serialize};
use thiserror::Error;

// ----- MediaType -----

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaType {
    Image,
    Video,
    Audio,
}

impl MediaType {
    pub fn as_str(&self) -> &'static str {
        match self {
            MediaType::Image => "image",
            MediaType::Video => "video",
            MediaType::Audio => "audio",
        }
    }

    /// Video and audio unfold over time and carry keyframes; images do not.
    pub fn is_temporal(&self) -> bool {
        matches!(self, MediaType::Video | MediaType::Audio)
    }
}

impl fmt::Display for MediaType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error)]
#[error("unknown media type: {0}")]
pub struct ParseMediaTypeError(pub String);

impl FromStr for MediaType {
    type Err = ParseMediaTypeError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "image" => Ok(MediaType::Image),
            "video" => Ok(MediaType::Video),
            "audio" => Ok(MediaType::Audio),
            other => Err(ParseMediaTypeError(other.to_string())),
        }
    }
}

impl ToSql for MediaType {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.as_str()))
    }
}

impl FromSql for MediaType {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        value
            .as_str()?
            .parse()
            .map_err(|e| FromSqlError::Other(Box::new(e)))
    }
}

// ----- MediaFile -----

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MediaFile {
    pub id: i64,
    pub path: String,
    pub media_type: MediaType,
    pub description: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

pub(crate) const MEDIA_FILE_COLUMNS: &str =
    "id, path, media_type, description, created_at, updated_at";

pub(crate) fn map_media_file(row: &rusqlite::Row) -> rusqlite::Result<MediaFile> {
    Ok(MediaFile {
        id: row.get(0)?,
        path: row.get(1)?,
        media_type: row.get(2)?,
        description: row.get(3)?,
        created_at: row.get(4)?,
        updated_at: row.get(5)?,
    })
}

/// Position of a file within the path-ordered catalogue.
/// `prev_id`/`next_id` wrap around at either end.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Navigation {
    pub prev_id: i64,
    pub next_id: i64,
    /// 1-based rank by path
    pub index: i64,
    pub total: i64,
}

// ----- Label -----

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Label {
    pub id: i64,
    pub name: String,
}

pub(crate) fn map_label(row: &rusqlite::Row) -> rusqlite::Result<Label> {
    Ok(Label {
        id: row.get(0)?,
        name: row.get(1)?,
    })
}

// ----- Keyframe -----

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Keyframe {
    pub id: i64,
    pub media_file_id: i64,
    pub timestamp_ms: i64,
    pub description: String,
    pub pinned: bool,
    pub labels: Vec<Label>,
}

pub(crate) const KEYFRAME_COLUMNS: &str = "id, media_file_id, timestamp_ms, description, pinned";

/// Maps the keyframe row only; labels are loaded separately.
pub(crate) fn map_keyframe(row: &rusqlite::Row) -> rusqlite::Result<Keyframe> {
    Ok(Keyframe {
        id: row.get(0)?,
        media_file_id: row.get(1)?,
        timestamp_ms: row.get(2)?,
        description: row.get(3)?,
        pinned: row.get(4)?,
        labels: Vec::new(),
    })
}
