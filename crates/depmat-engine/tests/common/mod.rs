//! Shared test sinks and stores.

#![allow(dead_code)]

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;

use depmat_core::errors::{SinkError, TrackerError};
use depmat_core::{DepmatConfig, NodeId, Snapshot, SnapshotSink};
use depmat_engine::{PhaseId, ProvenanceStore, SideTable};

/// Keeps every snapshot it receives.
#[derive(Default)]
pub struct RecordingSink {
    snapshots: Mutex<Vec<Snapshot>>,
}

impl RecordingSink {
    pub fn snapshots(&self) -> Vec<Snapshot> {
        self.snapshots.lock().unwrap().clone()
    }

    pub fn texts(&self) -> Vec<String> {
        self.snapshots().into_iter().map(|s| s.text).collect()
    }
}

impl SnapshotSink for RecordingSink {
    fn persist(&self, snapshot: Snapshot) -> Result<(), SinkError> {
        self.snapshots.lock().unwrap().push(snapshot);
        Ok(())
    }
}

/// Rejects every snapshot.
#[derive(Default)]
pub struct ClosedSink {
    pub attempts: AtomicU64,
}

impl SnapshotSink for ClosedSink {
    fn persist(&self, _snapshot: Snapshot) -> Result<(), SinkError> {
        self.attempts.fetch_add(1, Ordering::Relaxed);
        Err(SinkError::Closed)
    }
}

/// Side table that fails reads of the listed nodes.
pub struct FaultyStore {
    inner: SideTable,
    unreadable: Vec<NodeId>,
}

impl FaultyStore {
    pub fn new(unreadable: Vec<NodeId>) -> Self {
        Self {
            inner: SideTable::new(),
            unreadable,
        }
    }
}

impl ProvenanceStore for FaultyStore {
    fn load(&self, node: NodeId) -> Result<Option<PhaseId>, TrackerError> {
        if self.unreadable.contains(&node) {
            return Err(TrackerError::Unreadable {
                node: node.get(),
                message: "annotation slot corrupted".to_string(),
            });
        }
        self.inner.load(node)
    }

    fn store(&self, node: NodeId, phase: PhaseId) -> Result<(), TrackerError> {
        self.inner.store(node, phase)
    }
}

/// Config without the background sweeper, so tests control sweeping.
pub fn quiet_config() -> DepmatConfig {
    DepmatConfig::from_toml("[scope]\nbackground_sweep = false\n").unwrap()
}

pub fn nodes(ids: impl IntoIterator<Item = u64>) -> Vec<NodeId> {
    ids.into_iter().map(NodeId).collect()
}
