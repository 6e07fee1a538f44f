// Media discovery: walks a directory tree and classifies files by extension

use std::path::{Component, Path, PathBuf};

use serde::{Deserialize, Serialize};
use walkdir::WalkDir;

use crate::constants::{AUDIO_EXTENSIONS, IMAGE_EXTENSIONS, PATH_DB_SEPARATOR, VIDEO_EXTENSIONS};
use crate::db::schema::MediaType;
use crate::error::{JliError, Result};

/// A media file found under the scan root.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiscoveredFile {
    /// Relative to the scan root, `/`-separated
    pub path: String,
    pub media_type: MediaType,
}

/// Classify a file by its (case-insensitive) extension.
pub fn media_type_for_path(path: &Path) -> Option<MediaType> {
    let ext = path.extension().and_then(|e| e.to_str())?.to_lowercase();

    if IMAGE_EXTENSIONS.contains(&ext.as_str()) {
        Some(MediaType::Image)
    } else if VIDEO_EXTENSIONS.contains(&ext.as_str()) {
        Some(MediaType::Video)
    } else if AUDIO_EXTENSIONS.contains(&ext.as_str()) {
        Some(MediaType::Audio)
    } else {
        None
    }
}

/// Convert an on-disk path under `root` into the stored relative form.
fn relative_db_path(root: &Path, path: &Path) -> Option<String> {
    let rel = path.strip_prefix(root).ok()?;
    let mut parts = Vec::new();
    for component in rel.components() {
        match component {
            Component::Normal(part) => parts.push(part.to_str()?),
            _ => return None,
        }
    }
    if parts.is_empty() {
        return None;
    }
    Some(parts.join(&PATH_DB_SEPARATOR.to_string()))
}

/// Lazily walk `root`, yielding every recognised media file.
/// Unreadable entries and non-UTF-8 names are logged and skipped.
pub fn walk(root: &Path) -> impl Iterator<Item = DiscoveredFile> + '_ {
    WalkDir::new(root)
        .follow_links(true)
        .into_iter()
        .filter_map(|entry| match entry {
            Ok(e) => Some(e),
            Err(e) => {
                log::warn!("Skipping unreadable entry: {}", e);
                None
            }
        })
        .filter(|entry| entry.file_type().is_file())
        .filter_map(move |entry| {
            let media_type = media_type_for_path(entry.path())?;
            match relative_db_path(root, entry.path()) {
                Some(path) => Some(DiscoveredFile { path, media_type }),
                None => {
                    log::warn!("Skipping {}: path is not valid UTF-8", entry.path().display());
                    None
                }
            }
        })
}

/// Discover all media files under `root`, sorted by relative path.
pub fn scan(root: &Path) -> Result<Vec<DiscoveredFile>> {
    if !root.is_dir() {
        return Err(JliError::InvalidPath(format!(
            "{} is not a directory",
            root.display()
        )));
    }

    let mut files: Vec<DiscoveredFile> = walk(root).collect();
    files.sort_by(|a, b| a.path.cmp(&b.path));

    log::debug!("Discovered {} media files under {}", files.len(), root.display());
    Ok(files)
}

/// Resolve a stored relative path against the media root, refusing anything that
/// could escape it (absolute paths, `..`, prefixes).
pub fn resolve_media_path(root: &Path, relative: &str) -> Result<PathBuf> {
    if relative.is_empty() {
        return Err(JliError::InvalidPath("empty path".to_string()));
    }

    let mut resolved = root.to_path_buf();
    for component in Path::new(relative).components() {
        match component {
            Component::Normal(part) => resolved.push(part),
            Component::CurDir => {}
            _ => return Err(JliError::InvalidPath(relative.to_string())),
        }
    }
    Ok(resolved)
}
