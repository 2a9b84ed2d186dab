//! SnapshotSink trait: where finished unit snapshots are handed off.

use crate::errors::SinkError;
use crate::types::Snapshot;

/// Receives rendered snapshots of finished work units.
///
/// `persist` is fire-and-forget from the engine's point of view: it must
/// not block on I/O. Implementations either enqueue for a background
/// writer or store in memory. An `Err` means the hand-off itself failed
/// (e.g. the sink was shut down); the engine logs it and discards the
/// snapshot.
pub trait SnapshotSink: Send + Sync {
    fn persist(&self, snapshot: Snapshot) -> Result<(), SinkError>;
}

/// Discards every snapshot. Useful when only in-process queries are wanted.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullSink;

impl SnapshotSink for NullSink {
    fn persist(&self, snapshot: Snapshot) -> Result<(), SinkError> {
        ::tracing::trace!(unit_id = %snapshot.unit_id, "snapshot discarded by null sink");
        Ok(())
    }
}
