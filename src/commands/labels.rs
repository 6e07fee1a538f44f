// Just Label It - Label Commands
// Commands for attaching labels by name and searching them

use serde::Deserialize;

use super::{CommandError, CommandResult};
use crate::db::schema::Label;
use crate::store::Store;

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddLabelRequest {
    pub name: String,
}

impl AddLabelRequest {
    /// Trimmed label name; blank names are rejected.
    pub fn validated_name(&self) -> CommandResult<&str> {
        let name = self.name.trim();
        if name.is_empty() {
            return Err(CommandError::bad_request("label name must not be empty"));
        }
        Ok(name)
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SearchLabelsQuery {
    #[serde(default)]
    pub q: String,
}

/// Find-or-create a label by name and attach it to a file.
pub fn add_file_label(store: &Store, file_id: i64, req: &AddLabelRequest) -> CommandResult<Label> {
    let label = store.find_or_create_label(req.validated_name()?)?;
    store.attach_label_to_file(file_id, label.id)?;
    Ok(label)
}

pub fn remove_file_label(store: &Store, file_id: i64, label_id: i64) -> CommandResult<()> {
    store.detach_label_from_file(file_id, label_id)?;
    Ok(())
}

/// Find-or-create a label by name and attach it to a keyframe.
pub fn add_keyframe_label(
    store: &Store,
    keyframe_id: i64,
    req: &AddLabelRequest,
) -> CommandResult<Label> {
    let label = store.find_or_create_label(req.validated_name()?)?;
    store.attach_label_to_keyframe(keyframe_id, label.id)?;
    Ok(label)
}

pub fn remove_keyframe_label(store: &Store, keyframe_id: i64, label_id: i64) -> CommandResult<()> {
    store.detach_label_from_keyframe(keyframe_id, label_id)?;
    Ok(())
}

/// Autocomplete: up to ten labels starting with the query. Empty query, empty result.
pub fn search_labels(store: &Store, query: &SearchLabelsQuery) -> CommandResult<Vec<Label>> {
    if query.q.is_empty() {
        return Ok(Vec::new());
    }
    Ok(store.search_labels(&query.q)?)
}
