// Library configuration
//
// Database path resolution order:
// 1) Explicit --db flag
// 2) Environment variable override (JLI_DB)
// 3) jli.db inside the media root

use std::env;
use std::ffi::OsString;
use std::path::{Path, PathBuf};

use crate::constants::DB_PATH_ENV;
use crate::db::get_db_path;
use crate::error::{JliError, Result};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LibraryConfig {
    /// Directory that is scanned and that stored paths are relative to
    pub media_root: PathBuf,
    pub db_path: PathBuf,
}

impl LibraryConfig {
    /// Build the configuration for a media root (current directory when omitted).
    pub fn resolve(media_root: Option<PathBuf>, db_flag: Option<PathBuf>) -> Result<Self> {
        let root = match media_root {
            Some(p) => p,
            None => env::current_dir()?,
        };
        let root = root.canonicalize().unwrap_or(root);

        if !root.is_dir() {
            return Err(JliError::InvalidPath(format!(
                "{} is not a directory",
                root.display()
            )));
        }

        let db_path = resolve_db_path(&root, db_flag);
        Ok(Self {
            media_root: root,
            db_path,
        })
    }
}

/// Resolve the database location for a media root.
pub fn resolve_db_path(media_root: &Path, db_flag: Option<PathBuf>) -> PathBuf {
    resolve_db_path_with(media_root, db_flag, env::var_os(DB_PATH_ENV))
}

fn resolve_db_path_with(
    media_root: &Path,
    db_flag: Option<PathBuf>,
    env_value: Option<OsString>,
) -> PathBuf {
    if let Some(p) = db_flag {
        return p;
    }

    match env_value {
        Some(v) if !v.is_empty() => PathBuf::from(v),
        _ => get_db_path(media_root),
    }
}
