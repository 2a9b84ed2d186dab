//! # depmat-storage
//!
//! Snapshot persistence. [`AsyncSnapshotSink`] implements
//! [`depmat_core::SnapshotSink`] by queueing snapshots to a dedicated writer
//! thread, so the host pipeline never waits on I/O. The thread hands each
//! snapshot to a [`SnapshotWriter`] backend.

pub mod connection;
pub mod migrations;
pub mod queries;
pub mod sink;
pub mod writer;

pub use sink::{AsyncSnapshotSink, SinkCommand, SinkStats};
pub use writer::{
    open_writer, DirectoryWriter, MemoryStore, MemoryWriter, SnapshotWriter, SqliteWriter,
};
