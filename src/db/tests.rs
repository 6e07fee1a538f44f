// Cross-table behaviour of the catalogue schema

use super::keyframes::*;
use super::labels::*;
use super::media::*;
use super::open_in_memory;
use super::schema::MediaType;
use rusqlite::{params, Connection};

fn count(conn: &Connection, sql: &str, id: i64) -> i64 {
    conn.query_row(sql, params![id], |row| row.get(0)).unwrap()
}

fn add_file(conn: &Connection, path: &str, media_type: MediaType) -> i64 {
    upsert_media_file(conn, path, media_type).unwrap();
    get_media_file_by_path(conn, path).unwrap().unwrap().id
}

#[test]
fn test_foreign_keys_are_enforced() {
    let conn = open_in_memory().unwrap();
    let enabled: i64 = conn
        .query_row("PRAGMA foreign_keys", [], |row| row.get(0))
        .unwrap();
    assert_eq!(enabled, 1);
}

#[test]
fn test_deleting_file_cascades_but_keeps_labels() {
    let conn = open_in_memory().unwrap();
    let video = add_file(&conn, "clip.mp4", MediaType::Video);
    let other = add_file(&conn, "other.mp4", MediaType::Video);

    let funny = find_or_create_label(&conn, "funny").unwrap();
    let outdoor = find_or_create_label(&conn, "outdoor").unwrap();

    add_media_label(&conn, video, funny.id).unwrap();
    add_media_label(&conn, other, funny.id).unwrap();

    ensure_pinned_keyframe(&conn, video).unwrap();
    let kf = create_keyframe(&conn, video, 4_200).unwrap();
    add_keyframe_label(&conn, kf.id, outdoor.id).unwrap();

    delete_media_file(&conn, video).unwrap();

    assert_eq!(count(&conn, "SELECT COUNT(*) FROM keyframes WHERE media_file_id = ?1", video), 0);
    assert_eq!(count(&conn, "SELECT COUNT(*) FROM media_labels WHERE media_file_id = ?1", video), 0);
    assert_eq!(count(&conn, "SELECT COUNT(*) FROM keyframe_labels WHERE keyframe_id = ?1", kf.id), 0);

    // Labels and the other file's associations survive
    assert!(get_label(&conn, funny.id).unwrap().is_some());
    assert!(get_label(&conn, outdoor.id).unwrap().is_some());
    assert_eq!(labels_for_media_file(&conn, other).unwrap(), vec![funny]);
}

#[test]
fn test_labels_are_shared_between_files_and_keyframes() {
    let conn = open_in_memory().unwrap();
    let photo = add_file(&conn, "a.jpg", MediaType::Image);
    let song = add_file(&conn, "b.mp3", MediaType::Audio);

    let shared = find_or_create_label(&conn, "sunset").unwrap();
    add_media_label(&conn, photo, shared.id).unwrap();

    let kf = create_keyframe(&conn, song, 30_000).unwrap();
    let reused = find_or_create_label(&conn, "sunset").unwrap();
    add_keyframe_label(&conn, kf.id, reused.id).unwrap();

    assert_eq!(shared.id, reused.id);
    assert_eq!(labels_for_keyframe(&conn, kf.id).unwrap(), vec![shared.clone()]);
    assert_eq!(labels_for_media_file(&conn, photo).unwrap(), vec![shared]);
    assert!(labels_for_media_file(&conn, song).unwrap().is_empty());
}

#[test]
fn test_detaching_keyframe_label_leaves_label() {
    let conn = open_in_memory().unwrap();
    let song = add_file(&conn, "b.mp3", MediaType::Audio);
    let kf = create_keyframe(&conn, song, 1).unwrap();
    let label = find_or_create_label(&conn, "chorus").unwrap();

    add_keyframe_label(&conn, kf.id, label.id).unwrap();
    add_keyframe_label(&conn, kf.id, label.id).unwrap();
    assert_eq!(labels_for_keyframe(&conn, kf.id).unwrap().len(), 1);

    remove_keyframe_label(&conn, kf.id, label.id).unwrap();
    remove_keyframe_label(&conn, kf.id, label.id).unwrap();
    assert!(labels_for_keyframe(&conn, kf.id).unwrap().is_empty());
    assert_eq!(search_labels(&conn, "cho").unwrap(), vec![label]);
}

#[test]
fn test_second_pinned_row_is_rejected_by_schema() {
    let conn = open_in_memory().unwrap();
    let video = add_file(&conn, "clip.mp4", MediaType::Video);
    ensure_pinned_keyframe(&conn, video).unwrap();

    let err = conn
        .execute(
            "INSERT INTO keyframes (media_file_id, timestamp_ms, pinned) VALUES (?1, 0, 1)",
            params![video],
        )
        .unwrap_err();
    assert!(crate::error::JliError::is_unique_violation(&err));
}
