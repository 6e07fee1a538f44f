// Just Label It - Keyframe Commands

use serde::Deserialize;

use super::files::UpdateDescriptionRequest;
use super::{CommandError, CommandResult};
use crate::db::schema::Keyframe;
use crate::store::Store;

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KeyframeTimestampRequest {
    #[serde(alias = "timestamp_ms")]
    pub timestamp_ms: i64,
}

impl KeyframeTimestampRequest {
    fn validated(&self) -> CommandResult<i64> {
        if self.timestamp_ms < 0 {
            return Err(CommandError::bad_request("timestamp must not be negative"));
        }
        Ok(self.timestamp_ms)
    }
}

pub fn create_keyframe(
    store: &Store,
    file_id: i64,
    req: &KeyframeTimestampRequest,
) -> CommandResult<Keyframe> {
    Ok(store.create_keyframe(file_id, req.validated()?)?)
}

/// Move a keyframe; the pinned keyframe answers Forbidden.
pub fn move_keyframe(store: &Store, id: i64, req: &KeyframeTimestampRequest) -> CommandResult<()> {
    store.update_keyframe_timestamp(id, req.validated()?)?;
    Ok(())
}

pub fn update_keyframe_description(
    store: &Store,
    id: i64,
    req: &UpdateDescriptionRequest,
) -> CommandResult<()> {
    store.update_keyframe_description(id, &req.description)?;
    Ok(())
}

pub fn delete_keyframe(store: &Store, id: i64) -> CommandResult<()> {
    store.delete_keyframe(id)?;
    Ok(())
}
