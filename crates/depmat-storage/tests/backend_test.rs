//! Directory, SQLite and factory backends.

mod common;

use std::fs;

use common::snapshot;
use depmat_core::config::{SinkConfig, SinkKind};
use depmat_storage::connection::open_reader;
use depmat_storage::connection::pragmas::verify_wal_mode;
use depmat_storage::migrations::{current_version, run_migrations};
use depmat_storage::queries::snapshots;
use depmat_storage::{open_writer, DirectoryWriter, SnapshotWriter, SqliteWriter};
use rusqlite::Connection;
use tempfile::TempDir;

fn file_names(dir: &std::path::Path) -> Vec<String> {
    let mut names: Vec<String> = fs::read_dir(dir)
        .unwrap()
        .map(|e| e.unwrap().file_name().into_string().unwrap())
        .collect();
    names.sort();
    names
}

#[test]
fn directory_writer_never_overwrites_same_label() {
    let tmp = TempDir::new().unwrap();
    let mut writer = DirectoryWriter::open(tmp.path()).unwrap();
    writer.write(&snapshot(1, "req")).unwrap();
    writer.write(&snapshot(2, "req")).unwrap();

    assert_eq!(
        file_names(tmp.path()),
        vec!["000001-req.depmat", "000002-req.depmat"]
    );
    let text = fs::read_to_string(tmp.path().join("000002-req.depmat")).unwrap();
    assert_eq!(text, snapshot(2, "req").text);
}

#[test]
fn directory_writer_continues_numbering_across_runs() {
    let tmp = TempDir::new().unwrap();
    DirectoryWriter::open(tmp.path())
        .unwrap()
        .write(&snapshot(1, "first"))
        .unwrap();

    let mut reopened = DirectoryWriter::open(tmp.path()).unwrap();
    reopened.write(&snapshot(2, "second")).unwrap();

    assert_eq!(
        file_names(tmp.path()),
        vec!["000001-first.depmat", "000002-second.depmat"]
    );
}

#[test]
fn directory_writer_sanitizes_labels() {
    let tmp = TempDir::new().unwrap();
    let mut writer = DirectoryWriter::open(tmp.path()).unwrap();
    writer.write(&snapshot(1, "../escape me")).unwrap();

    assert_eq!(file_names(tmp.path()), vec!["000001-_escape_me.depmat"]);
}

#[test]
fn sqlite_writer_stores_rows() {
    let tmp = TempDir::new().unwrap();
    let db = tmp.path().join("depmat.db");
    let mut writer = SqliteWriter::open(&db).unwrap();
    writer.write(&snapshot(1, "req-1")).unwrap();
    writer.write(&snapshot(2, "req-2")).unwrap();
    writer.write(&snapshot(3, "req-1")).unwrap();
    assert!(verify_wal_mode(writer.connection()).unwrap());

    // Reader alongside the live writer.
    let conn = open_reader(&db).unwrap();
    assert_eq!(snapshots::count(&conn).unwrap(), 3);
    let rows = snapshots::list(&conn).unwrap();
    assert_eq!(rows[1].snapshot.unit_label, "req-2");
    assert_eq!(rows[1].snapshot.text, snapshot(2, "x").text);

    let latest = snapshots::latest_by_label(&conn, "req-1").unwrap().unwrap();
    assert_eq!(latest.snapshot.unit_id.get(), 3);
    assert_eq!(latest.snapshot.duration.as_millis(), 12);
    assert!(snapshots::latest_by_label(&conn, "missing").unwrap().is_none());
    assert!(snapshots::insert(&conn, &snapshot(4, "ro")).is_err());
}

#[test]
fn migrations_are_idempotent() {
    let conn = Connection::open_in_memory().unwrap();
    run_migrations(&conn).unwrap();
    run_migrations(&conn).unwrap();
    assert_eq!(current_version(&conn).unwrap(), 1);
}

#[test]
fn factory_opens_configured_backend() {
    let tmp = TempDir::new().unwrap();
    let config = SinkConfig {
        kind: Some(SinkKind::Sqlite),
        output_dir: Some(tmp.path().join("out")),
        snapshot_name: Some("graph".to_string()),
        ..SinkConfig::default()
    };
    let mut writer = open_writer(&config).unwrap();
    writer.write(&snapshot(1, "req")).unwrap();
    assert!(writer.describe().starts_with("sqlite"));
    drop(writer);
    assert!(tmp.path().join("out").join("graph.db").exists());

    let config = SinkConfig {
        kind: Some(SinkKind::Directory),
        output_dir: Some(tmp.path().join("dumps")),
        ..SinkConfig::default()
    };
    let mut writer = open_writer(&config).unwrap();
    writer.write(&snapshot(1, "req")).unwrap();
    assert_eq!(
        file_names(&tmp.path().join("dumps")),
        vec!["000001-req.depmat"]
    );
}
