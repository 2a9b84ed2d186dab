//! Collaborator boundaries.

pub mod snapshot_sink;

pub use snapshot_sink::{NullSink, SnapshotSink};
