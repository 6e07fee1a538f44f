// Just Label It - File Commands
// Viewer aggregate, listing, descriptions and media path resolution

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use super::{CommandError, CommandResult};
use crate::constants::DEFAULT_LIST_LIMIT;
use crate::db::schema::{Keyframe, Label, MediaFile, Navigation};
use crate::error::JliError;
use crate::scanner;
use crate::store::Store;

/// Everything needed to display one file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileView {
    pub file: MediaFile,
    pub labels: Vec<Label>,
    /// Empty for images
    pub keyframes: Vec<Keyframe>,
    pub navigation: Navigation,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListFilesRequest {
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileListResponse {
    pub files: Vec<MediaFile>,
    pub total: i64,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateDescriptionRequest {
    pub description: String,
}

/// Entry point of the catalogue: the first file by path, or None when empty.
pub fn first_file(store: &Store) -> CommandResult<Option<MediaFile>> {
    Ok(store.first_media_file()?)
}

/// Load a file with its labels, navigation and (for video/audio) keyframes.
/// Viewing a temporal file for the first time creates its pinned keyframe.
pub fn view_file(store: &Store, id: i64) -> CommandResult<FileView> {
    let file = store
        .get_media_file(id)?
        .ok_or_else(|| JliError::not_found("Media file", id))?;

    let labels = store.labels_for_file(id)?;
    let navigation = store.navigation(id)?;

    let keyframes = if file.media_type.is_temporal() {
        store.ensure_pinned_keyframe(id)?;
        store.keyframes_for_file(id)?
    } else {
        Vec::new()
    };

    Ok(FileView {
        file,
        labels,
        keyframes,
        navigation,
    })
}

pub fn list_files(store: &Store, req: &ListFilesRequest) -> CommandResult<FileListResponse> {
    let limit = req.limit.unwrap_or(DEFAULT_LIST_LIMIT);
    let offset = req.offset.unwrap_or(0);
    if limit <= 0 {
        return Err(CommandError::bad_request("limit must be positive"));
    }
    if offset < 0 {
        return Err(CommandError::bad_request("offset must not be negative"));
    }

    Ok(FileListResponse {
        files: store.list_media_files(limit, offset)?,
        total: store.count_media_files()?,
    })
}

pub fn update_file_description(
    store: &Store,
    id: i64,
    req: &UpdateDescriptionRequest,
) -> CommandResult<()> {
    store.update_media_description(id, &req.description)?;
    Ok(())
}

/// Map a requested media path onto disk, refusing paths outside the root.
pub fn resolve_media(media_root: &Path, relative: &str) -> CommandResult<PathBuf> {
    Ok(scanner::resolve_media_path(media_root, relative)?)
}
