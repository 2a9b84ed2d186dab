//! PRAGMA configuration applied to the snapshot database.
//!
//! WAL mode, NORMAL sync, 5s busy_timeout, temp_store MEMORY.

use depmat_core::errors::StorageError;
use rusqlite::Connection;

/// Apply write-side pragmas to a connection.
pub fn apply_pragmas(conn: &Connection) -> Result<(), StorageError> {
    conn.execute_batch(
        "
        PRAGMA journal_mode = WAL;
        PRAGMA synchronous = NORMAL;
        PRAGMA busy_timeout = 5000;
        PRAGMA temp_store = MEMORY;
        ",
    )
    .map_err(|e| StorageError::SqliteError {
        message: format!("failed to apply pragmas: {e}"),
    })
}

/// Apply read-only pragmas to a reader connection.
pub fn apply_read_pragmas(conn: &Connection) -> Result<(), StorageError> {
    conn.execute_batch(
        "
        PRAGMA query_only = ON;
        PRAGMA busy_timeout = 5000;
        ",
    )
    .map_err(|e| StorageError::SqliteError {
        message: format!("failed to apply read pragmas: {e}"),
    })
}

/// Whether the connection runs in WAL mode.
pub fn verify_wal_mode(conn: &Connection) -> Result<bool, StorageError> {
    let mode: String = conn
        .pragma_query_value(None, "journal_mode", |row| row.get(0))
        .map_err(|e| StorageError::SqliteError {
            message: e.to_string(),
        })?;
    Ok(mode.eq_ignore_ascii_case("wal"))
}

/// Run `PRAGMA optimize` before the writer closes its connection.
pub fn optimize_on_close(conn: &Connection) -> Result<(), StorageError> {
    conn.execute_batch(
        "
        PRAGMA analysis_limit = 400;
        PRAGMA optimize;
        ",
    )
    .map_err(|e| StorageError::SqliteError {
        message: format!("failed to optimize: {e}"),
    })
}
