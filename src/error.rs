// Just Label It Error Types

use rusqlite::ErrorCode;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum JliError {
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: i64 },

    #[error("Keyframe {0} is pinned and cannot be moved or deleted")]
    PinnedKeyframe(i64),

    #[error("Media file {0} is not video or audio")]
    NotTemporal(i64),

    #[error("Invalid path: {0}")]
    InvalidPath(String),

    #[error("Constraint violation: {0}")]
    ConstraintViolation(String),

    #[error("Storage unavailable: {0}")]
    StorageUnavailable(String),
}

impl JliError {
    pub fn not_found(entity: &'static str, id: i64) -> Self {
        JliError::NotFound { entity, id }
    }

    /// True for the unique/primary-key flavour of a constraint violation.
    pub fn is_unique_violation(err: &rusqlite::Error) -> bool {
        match err {
            rusqlite::Error::SqliteFailure(e, _) => {
                e.code == ErrorCode::ConstraintViolation
                    && (e.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE
                        || e.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_PRIMARYKEY)
            }
            _ => false,
        }
    }

    /// Sort a raw SQLite error into the error kinds callers act on.
    pub fn classify(err: rusqlite::Error) -> Self {
        match &err {
            rusqlite::Error::SqliteFailure(e, msg) if e.code == ErrorCode::ConstraintViolation => {
                JliError::ConstraintViolation(msg.clone().unwrap_or_else(|| e.to_string()))
            }
            rusqlite::Error::SqliteFailure(e, _)
                if matches!(
                    e.code,
                    ErrorCode::CannotOpen
                        | ErrorCode::NotADatabase
                        | ErrorCode::DatabaseCorrupt
                        | ErrorCode::ReadOnly
                        | ErrorCode::PermissionDenied
                ) =>
            {
                JliError::StorageUnavailable(err.to_string())
            }
            _ => JliError::Database(err),
        }
    }
}

pub type Result<T> = std::result::Result<T, JliError>;
