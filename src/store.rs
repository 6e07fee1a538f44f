// Store facade
//
// One session object owning the single SQLite connection. Every operation takes the
// connection lock for its whole duration, so writes never interleave at the
// statement level and multi-statement checks (pinned guard, find-or-create) run
// without interference from other callers.

use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};

use rusqlite::Connection;
use serde::{Deserialize, Serialize};

use crate::db::schema::{Keyframe, Label, MediaFile, MediaType, Navigation};
use crate::db::{self, keyframes, labels, media};
use crate::error::{JliError, Result};
use crate::scanner::DiscoveredFile;

/// Outcome of feeding scanner output into the store.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IngestSummary {
    pub seen: usize,
    pub inserted: usize,
    pub total: i64,
}

pub struct Store {
    conn: Mutex<Connection>,
    db_path: Option<PathBuf>,
}

impl Store {
    /// Open (creating if needed) and migrate the database at `db_path`.
    pub fn open(db_path: &Path) -> Result<Self> {
        let conn = db::open_db(db_path)?;
        log::info!("Opened catalogue at {}", db_path.display());
        Ok(Self {
            conn: Mutex::new(conn),
            db_path: Some(db_path.to_path_buf()),
        })
    }

    /// A private in-memory catalogue.
    pub fn open_in_memory() -> Result<Self> {
        Ok(Self {
            conn: Mutex::new(db::open_in_memory()?),
            db_path: None,
        })
    }

    pub fn db_path(&self) -> Option<&Path> {
        self.db_path.as_deref()
    }

    /// Flush and release the connection. Dropping the store does the same
    /// but swallows close errors.
    pub fn close(self) -> Result<()> {
        let conn = self
            .conn
            .into_inner()
            .map_err(|_| JliError::StorageUnavailable("store lock poisoned".to_string()))?;
        conn.close().map_err(|(_, e)| JliError::Database(e))
    }

    fn lock(&self) -> Result<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|_| JliError::StorageUnavailable("store lock poisoned".to_string()))
    }

    fn with_conn<T>(&self, f: impl FnOnce(&Connection) -> Result<T>) -> Result<T> {
        let conn = self.lock()?;
        f(&conn)
    }

    // ----- Media files -----

    pub fn upsert_media_file(&self, path: &str, media_type: MediaType) -> Result<bool> {
        self.with_conn(|conn| media::upsert_media_file(conn, path, media_type))
    }

    /// Bulk idempotent upsert of scanner output in one transaction.
    /// Duplicates and any input order are fine.
    pub fn ingest<I>(&self, files: I) -> Result<IngestSummary>
    where
        I: IntoIterator<Item = DiscoveredFile>,
    {
        self.with_conn(|conn| {
            let tx = conn.unchecked_transaction()?;
            let mut summary = IngestSummary::default();

            for file in files {
                summary.seen += 1;
                if media::upsert_media_file(&tx, &file.path, file.media_type)? {
                    summary.inserted += 1;
                }
            }

            summary.total = media::count_media_files(&tx)?;
            tx.commit()?;

            log::info!(
                "Ingested {} files ({} new, {} total)",
                summary.seen,
                summary.inserted,
                summary.total
            );
            Ok(summary)
        })
    }

    pub fn get_media_file(&self, id: i64) -> Result<Option<MediaFile>> {
        self.with_conn(|conn| media::get_media_file(conn, id))
    }

    pub fn get_media_file_by_path(&self, path: &str) -> Result<Option<MediaFile>> {
        self.with_conn(|conn| media::get_media_file_by_path(conn, path))
    }

    pub fn first_media_file(&self) -> Result<Option<MediaFile>> {
        self.with_conn(media::first_media_file)
    }

    pub fn count_media_files(&self) -> Result<i64> {
        self.with_conn(media::count_media_files)
    }

    pub fn list_media_files(&self, limit: i64, offset: i64) -> Result<Vec<MediaFile>> {
        self.with_conn(|conn| media::list_media_files(conn, limit, offset))
    }

    pub fn update_media_description(&self, id: i64, description: &str) -> Result<()> {
        self.with_conn(|conn| media::update_description(conn, id, description))
    }

    pub fn navigation(&self, id: i64) -> Result<Navigation> {
        self.with_conn(|conn| media::get_navigation(conn, id))
    }

    pub fn delete_media_file(&self, id: i64) -> Result<()> {
        self.with_conn(|conn| media::delete_media_file(conn, id))
    }

    // ----- Labels -----

    pub fn find_or_create_label(&self, name: &str) -> Result<Label> {
        self.with_conn(|conn| labels::find_or_create_label(conn, name))
    }

    pub fn get_label(&self, id: i64) -> Result<Option<Label>> {
        self.with_conn(|conn| labels::get_label(conn, id))
    }

    pub fn search_labels(&self, query: &str) -> Result<Vec<Label>> {
        self.with_conn(|conn| labels::search_labels(conn, query))
    }

    pub fn attach_label_to_file(&self, media_file_id: i64, label_id: i64) -> Result<()> {
        self.with_conn(|conn| labels::add_media_label(conn, media_file_id, label_id))
    }

    pub fn detach_label_from_file(&self, media_file_id: i64, label_id: i64) -> Result<()> {
        self.with_conn(|conn| labels::remove_media_label(conn, media_file_id, label_id))
    }

    pub fn labels_for_file(&self, media_file_id: i64) -> Result<Vec<Label>> {
        self.with_conn(|conn| labels::labels_for_media_file(conn, media_file_id))
    }

    pub fn attach_label_to_keyframe(&self, keyframe_id: i64, label_id: i64) -> Result<()> {
        self.with_conn(|conn| labels::add_keyframe_label(conn, keyframe_id, label_id))
    }

    pub fn detach_label_from_keyframe(&self, keyframe_id: i64, label_id: i64) -> Result<()> {
        self.with_conn(|conn| labels::remove_keyframe_label(conn, keyframe_id, label_id))
    }

    pub fn labels_for_keyframe(&self, keyframe_id: i64) -> Result<Vec<Label>> {
        self.with_conn(|conn| labels::labels_for_keyframe(conn, keyframe_id))
    }

    // ----- Keyframes -----

    pub fn ensure_pinned_keyframe(&self, media_file_id: i64) -> Result<bool> {
        self.with_conn(|conn| keyframes::ensure_pinned_keyframe(conn, media_file_id))
    }

    pub fn create_keyframe(&self, media_file_id: i64, timestamp_ms: i64) -> Result<Keyframe> {
        self.with_conn(|conn| keyframes::create_keyframe(conn, media_file_id, timestamp_ms))
    }

    pub fn get_keyframe(&self, id: i64) -> Result<Option<Keyframe>> {
        self.with_conn(|conn| keyframes::get_keyframe(conn, id))
    }

    pub fn keyframes_for_file(&self, media_file_id: i64) -> Result<Vec<Keyframe>> {
        self.with_conn(|conn| keyframes::keyframes_for_media_file(conn, media_file_id))
    }

    pub fn update_keyframe_timestamp(&self, id: i64, timestamp_ms: i64) -> Result<()> {
        self.with_conn(|conn| keyframes::update_keyframe_timestamp(conn, id, timestamp_ms))
    }

    pub fn update_keyframe_description(&self, id: i64, description: &str) -> Result<()> {
        self.with_conn(|conn| keyframes::update_keyframe_description(conn, id, description))
    }

    pub fn delete_keyframe(&self, id: i64) -> Result<()> {
        self.with_conn(|conn| keyframes::delete_keyframe(conn, id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::sync::Arc;
    use std::thread;
    use tempfile::TempDir;

    fn discovered(path: &str, media_type: MediaType) -> DiscoveredFile {
        DiscoveredFile {
            path: path.to_string(),
            media_type,
        }
    }

    #[test]
    fn test_ingest_tolerates_duplicates_and_order() {
        let store = Store::open_in_memory().unwrap();

        let summary = store
            .ingest(vec![
                discovered("z.mp3", MediaType::Audio),
                discovered("a.jpg", MediaType::Image),
                discovered("z.mp3", MediaType::Audio),
            ])
            .unwrap();
        assert_eq!(summary, IngestSummary { seen: 3, inserted: 2, total: 2 });

        let again = store.ingest(vec![discovered("a.jpg", MediaType::Video)]).unwrap();
        assert_eq!(again.inserted, 0);
        assert_eq!(
            store.get_media_file_by_path("a.jpg").unwrap().unwrap().media_type,
            MediaType::Image
        );
        assert_eq!(store.first_media_file().unwrap().unwrap().path, "a.jpg");
    }

    #[test]
    fn test_concurrent_find_or_create_yields_one_label() {
        let store = Arc::new(Store::open_in_memory().unwrap());

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let store = Arc::clone(&store);
                thread::spawn(move || {
                    (0..25)
                        .map(|_| store.find_or_create_label("x").unwrap().id)
                        .collect::<Vec<_>>()
                })
            })
            .collect();

        let ids: Vec<i64> = handles
            .into_iter()
            .flat_map(|h| h.join().unwrap())
            .collect();
        assert!(ids.iter().all(|id| *id == ids[0]));

        assert_eq!(store.search_labels("x").unwrap().len(), 1);
    }

    #[test]
    fn test_find_or_create_across_connections_yields_one_label() {
        let dir = TempDir::new().unwrap();
        let db_path = db::get_db_path(dir.path());
        // Migrate once so the racing stores only contend on labels
        Store::open(&db_path).unwrap().close().unwrap();

        let names: Vec<String> = (0..50).map(|i| format!("label{:02}", i)).collect();

        let handles: Vec<_> = (0..6)
            .map(|_| {
                let db_path = db_path.clone();
                let names = names.clone();
                thread::spawn(move || {
                    let store = Store::open(&db_path).unwrap();
                    names
                        .iter()
                        .map(|name| store.find_or_create_label(name).map(|l| (l.name, l.id)))
                        .collect::<Vec<_>>()
                })
            })
            .collect();

        let mut ids: HashMap<String, i64> = HashMap::new();
        for handle in handles {
            for result in handle.join().unwrap() {
                let (name, id) = result.unwrap();
                assert_eq!(*ids.entry(name).or_insert(id), id);
            }
        }
        assert_eq!(ids.len(), names.len());

        let store = Store::open(&db_path).unwrap();
        let conn = store.lock().unwrap();
        for name in &names {
            let rows: i64 = conn
                .query_row("SELECT COUNT(*) FROM labels WHERE name = ?1", [name], |row| row.get(0))
                .unwrap();
            assert_eq!(rows, 1, "duplicate rows for {}", name);
        }
    }

    #[test]
    fn test_concurrent_ensure_pinned_yields_one_keyframe() {
        let store = Arc::new(Store::open_in_memory().unwrap());
        store.upsert_media_file("clip.mp4", MediaType::Video).unwrap();
        let file_id = store.first_media_file().unwrap().unwrap().id;

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let store = Arc::clone(&store);
                thread::spawn(move || store.ensure_pinned_keyframe(file_id).unwrap())
            })
            .collect();
        let created = handles
            .into_iter()
            .map(|h| h.join().unwrap())
            .filter(|created| *created)
            .count();

        assert_eq!(created, 1);
        let pinned: Vec<_> = store
            .keyframes_for_file(file_id)
            .unwrap()
            .into_iter()
            .filter(|kf| kf.pinned)
            .collect();
        assert_eq!(pinned.len(), 1);
    }

    #[test]
    fn test_reopen_keeps_data_and_schema() {
        let dir = TempDir::new().unwrap();
        let db_path = db::get_db_path(dir.path());

        {
            let store = Store::open(&db_path).unwrap();
            store.upsert_media_file("movie.mkv", MediaType::Video).unwrap();
            let id = store.first_media_file().unwrap().unwrap().id;
            store.update_media_description(id, "kept").unwrap();
            store.close().unwrap();
        }

        let store = Store::open(&db_path).unwrap();
        assert_eq!(store.db_path(), Some(db_path.as_path()));
        let file = store.first_media_file().unwrap().unwrap();
        assert_eq!(file.description, "kept");
        assert_eq!(store.count_media_files().unwrap(), 1);
    }

    #[test]
    fn test_open_unwritable_location_is_storage_unavailable() {
        let dir = TempDir::new().unwrap();
        let db_path = dir.path().join("missing").join("nested").join("jli.db");

        assert!(matches!(
            Store::open(&db_path),
            Err(JliError::StorageUnavailable(_))
        ));
    }
}
