// Just Label It Constants

// Paths
pub const PATH_DB_SEPARATOR: char = '/';
pub const DB_FILENAME: &str = "jli.db";

/// Environment override for the database location.
pub const DB_PATH_ENV: &str = "JLI_DB";

// Labels
pub const LABEL_SEARCH_LIMIT: i64 = 10;

// Keyframes
pub const PINNED_TIMESTAMP_MS: i64 = 0;

// Listing
pub const DEFAULT_LIST_LIMIT: i64 = 100;

// Media extensions (lowercase, no dot)
pub const IMAGE_EXTENSIONS: [&str; 10] = [
    "jpg", "jpeg", "png", "gif", "bmp", "webp", "svg", "tiff", "tif", "avif",
];

pub const VIDEO_EXTENSIONS: [&str; 7] = ["mp4", "webm", "mkv", "avi", "mov", "m4v", "ogv"];

pub const AUDIO_EXTENSIONS: [&str; 8] = ["mp3", "wav", "ogg", "flac", "aac", "m4a", "wma", "opus"];
