//! Blocking snapshot backends driven by the sink's writer thread.

pub mod directory;
pub mod memory;
pub mod sqlite;

pub use directory::DirectoryWriter;
pub use memory::{MemoryStore, MemoryWriter};
pub use sqlite::SqliteWriter;

use depmat_core::config::{SinkConfig, SinkKind};
use depmat_core::errors::SinkError;
use depmat_core::Snapshot;

/// A backend that writes one snapshot at a time. Runs on the writer thread
/// only, so it may block.
pub trait SnapshotWriter: Send {
    fn write(&mut self, snapshot: &Snapshot) -> Result<(), SinkError>;

    fn flush(&mut self) -> Result<(), SinkError> {
        Ok(())
    }

    /// Short description for log lines.
    fn describe(&self) -> String;
}

/// Open the backend named by `config`.
pub fn open_writer(config: &SinkConfig) -> Result<Box<dyn SnapshotWriter>, SinkError> {
    let dir = config.effective_output_dir();
    Ok(match config.effective_kind() {
        SinkKind::Directory => Box::new(DirectoryWriter::open(dir)?),
        SinkKind::Sqlite => {
            std::fs::create_dir_all(&dir).map_err(|source| SinkError::Io {
                path: dir.display().to_string(),
                source,
            })?;
            let db = dir.join(format!("{}.db", config.effective_snapshot_name()));
            Box::new(SqliteWriter::open(&db)?)
        }
        SinkKind::Memory => Box::new(MemoryWriter::new()),
    })
}
