//! Snapshot rows in a SQLite database.

use std::path::{Path, PathBuf};

use depmat_core::errors::{SinkError, StorageError};
use depmat_core::Snapshot;
use rusqlite::Connection;
use tracing::warn;

use super::SnapshotWriter;
use crate::connection::pragmas::{apply_pragmas, optimize_on_close};
use crate::migrations::run_migrations;
use crate::queries::snapshots;

pub struct SqliteWriter {
    conn: Connection,
    path: Option<PathBuf>,
}

impl SqliteWriter {
    /// Open (creating if needed) the database at `path` and migrate it.
    pub fn open(path: &Path) -> Result<Self, SinkError> {
        let conn = Connection::open(path).map_err(|e| StorageError::SqliteError {
            message: format!("failed to open {}: {e}", path.display()),
        })?;
        Self::init(conn, Some(path.to_path_buf()))
    }

    pub fn open_in_memory() -> Result<Self, SinkError> {
        let conn = Connection::open_in_memory().map_err(|e| StorageError::SqliteError {
            message: e.to_string(),
        })?;
        Self::init(conn, None)
    }

    fn init(conn: Connection, path: Option<PathBuf>) -> Result<Self, SinkError> {
        apply_pragmas(&conn)?;
        run_migrations(&conn)?;
        Ok(Self { conn, path })
    }

    pub fn connection(&self) -> &Connection {
        &self.conn
    }
}

impl SnapshotWriter for SqliteWriter {
    fn write(&mut self, snapshot: &Snapshot) -> Result<(), SinkError> {
        snapshots::insert(&self.conn, snapshot)?;
        Ok(())
    }

    fn describe(&self) -> String {
        match &self.path {
            Some(path) => format!("sqlite {}", path.display()),
            None => "sqlite :memory:".to_string(),
        }
    }
}

impl Drop for SqliteWriter {
    fn drop(&mut self) {
        if let Err(e) = optimize_on_close(&self.conn) {
            warn!("{e}");
        }
    }
}

impl std::fmt::Debug for SqliteWriter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SqliteWriter")
            .field("path", &self.path)
            .finish_non_exhaustive()
    }
}
