// Just Label It - Commands Module
// Typed request/response layer between a transport and the Store.
// Requests are validated here; the Store only ever sees well-formed input.

pub mod files;
pub mod keyframes;
pub mod labels;

pub use files::*;
pub use keyframes::*;
pub use labels::*;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::error::JliError;

/// Transport-neutral failure category (maps 1:1 onto HTTP 404/403/400/500).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ErrorCode {
    NotFound,
    Forbidden,
    BadRequest,
    Internal,
}

#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
#[error("{message}")]
#[serde(rename_all = "camelCase")]
pub struct CommandError {
    pub code: ErrorCode,
    pub message: String,
}

impl CommandError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self {
            code: ErrorCode::BadRequest,
            message: message.into(),
        }
    }
}

impl From<JliError> for CommandError {
    fn from(err: JliError) -> Self {
        let code = match &err {
            JliError::NotFound { .. } => ErrorCode::NotFound,
            JliError::PinnedKeyframe(_) | JliError::InvalidPath(_) => ErrorCode::Forbidden,
            JliError::NotTemporal(_) | JliError::ConstraintViolation(_) => ErrorCode::BadRequest,
            JliError::Database(_) | JliError::Io(_) | JliError::StorageUnavailable(_) => {
                log::error!("Command failed: {}", err);
                return Self {
                    code: ErrorCode::Internal,
                    message: "Internal error".to_string(),
                };
            }
        };
        Self {
            code,
            message: err.to_string(),
        }
    }
}

pub type CommandResult<T> = std::result::Result<T, CommandError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_kind_mapping() {
        let cases = [
            (JliError::not_found("Keyframe", 1), ErrorCode::NotFound),
            (JliError::PinnedKeyframe(1), ErrorCode::Forbidden),
            (JliError::InvalidPath("../x".into()), ErrorCode::Forbidden),
            (JliError::NotTemporal(1), ErrorCode::BadRequest),
            (JliError::ConstraintViolation("dup".into()), ErrorCode::BadRequest),
            (JliError::StorageUnavailable("gone".into()), ErrorCode::Internal),
        ];
        for (err, code) in cases {
            assert_eq!(CommandError::from(err).code, code);
        }
    }

    #[test]
    fn test_internal_errors_hide_details() {
        let err = CommandError::from(JliError::StorageUnavailable("/secret/path".into()));
        assert_eq!(err.message, "Internal error");
    }

    #[test]
    fn test_command_error_serializes() {
        let json = serde_json::to_value(CommandError::bad_request("nope")).unwrap();
        assert_eq!(json, serde_json::json!({"code": "badRequest", "message": "nope"}));
    }
}
