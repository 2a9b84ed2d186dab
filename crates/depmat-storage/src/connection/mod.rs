//! SQLite connection setup.

pub mod pragmas;

use std::path::Path;

use depmat_core::errors::StorageError;
use rusqlite::{Connection, OpenFlags};

/// Open a read-only connection to a snapshot database, e.g. for reports
/// while the sink keeps writing.
pub fn open_reader(path: &Path) -> Result<Connection, StorageError> {
    let conn = Connection::open_with_flags(
        path,
        OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX,
    )
    .map_err(|e| StorageError::SqliteError {
        message: format!("failed to open reader on {}: {e}", path.display()),
    })?;
    pragmas::apply_read_pragmas(&conn)?;
    Ok(conn)
}
