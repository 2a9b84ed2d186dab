//! Insert and read rows of the `snapshots` table.

use std::time::Duration;

use depmat_core::errors::StorageError;
use depmat_core::{Snapshot, UnitId};
use rusqlite::{params, Connection, OptionalExtension, Row};

/// A stored snapshot with its row id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SnapshotRow {
    pub id: i64,
    pub snapshot: Snapshot,
}

fn sqlite_err(e: rusqlite::Error) -> StorageError {
    StorageError::SqliteError {
        message: e.to_string(),
    }
}

/// Insert one snapshot. Returns its row id.
pub fn insert(conn: &Connection, snapshot: &Snapshot) -> Result<i64, StorageError> {
    conn.prepare_cached(
        "INSERT INTO snapshots (unit_id, unit_label, name, started_at_ms, duration_ms, text)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
    )
    .and_then(|mut stmt| {
        stmt.execute(params![
            snapshot.unit_id.get() as i64,
            snapshot.unit_label,
            snapshot.name,
            snapshot.started_at_ms as i64,
            snapshot.duration.as_millis() as i64,
            snapshot.text,
        ])
    })
    .map_err(sqlite_err)?;
    Ok(conn.last_insert_rowid())
}

/// Number of stored snapshots.
pub fn count(conn: &Connection) -> Result<u64, StorageError> {
    conn.query_row("SELECT COUNT(*) FROM snapshots", [], |row| {
        row.get::<_, i64>(0)
    })
    .map(|n| n as u64)
    .map_err(sqlite_err)
}

/// All snapshots in insertion order.
pub fn list(conn: &Connection) -> Result<Vec<SnapshotRow>, StorageError> {
    let mut stmt = conn
        .prepare_cached(
            "SELECT id, unit_id, unit_label, name, started_at_ms, duration_ms, text
             FROM snapshots ORDER BY id",
        )
        .map_err(sqlite_err)?;
    let rows = stmt.query_map([], map_row).map_err(sqlite_err)?;
    rows.collect::<Result<Vec<_>, _>>().map_err(sqlite_err)
}

/// The most recent snapshot with `label`.
pub fn latest_by_label(conn: &Connection, label: &str) -> Result<Option<SnapshotRow>, StorageError> {
    conn.query_row(
        "SELECT id, unit_id, unit_label, name, started_at_ms, duration_ms, text
         FROM snapshots WHERE unit_label = ?1 ORDER BY id DESC LIMIT 1",
        params![label],
        map_row,
    )
    .optional()
    .map_err(sqlite_err)
}

fn map_row(row: &Row<'_>) -> rusqlite::Result<SnapshotRow> {
    Ok(SnapshotRow {
        id: row.get(0)?,
        snapshot: Snapshot {
            unit_id: UnitId(row.get::<_, i64>(1)? as u64),
            unit_label: row.get(2)?,
            name: row.get(3)?,
            started_at_ms: row.get::<_, i64>(4)? as u64,
            duration: Duration::from_millis(row.get::<_, i64>(5)? as u64),
            text: row.get(6)?,
        },
    })
}
