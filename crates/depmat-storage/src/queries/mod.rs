//! Snapshot table queries.

pub mod snapshots;

pub use snapshots::SnapshotRow;
