//! NodeProvenanceTracker: creation-phase reads and stamps over a store.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use depmat_core::errors::{DepmatErrorCode, TrackerError};
use depmat_core::NodeId;
use tracing::warn;

use super::store::{ProvenanceStore, SideTable};
use crate::phase::PhaseId;

/// Result of stamping one batch of nodes at phase exit.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StampOutcome {
    /// Nodes that were unmarked and now carry the phase.
    pub stamped: u64,
    /// Nodes that already carried a stamp.
    pub already_marked: u64,
    /// Nodes whose store access failed.
    pub faults: u64,
}

/// Reads and writes node creation stamps.
pub struct NodeProvenanceTracker {
    store: Arc<dyn ProvenanceStore>,
    faults: AtomicU64,
}

impl NodeProvenanceTracker {
    pub fn new(store: Arc<dyn ProvenanceStore>) -> Self {
        Self {
            store,
            faults: AtomicU64::new(0),
        }
    }

    /// Tracker over a fresh side table.
    pub fn with_side_table(capacity: usize) -> Self {
        Self::new(Arc::new(SideTable::with_capacity(capacity)))
    }

    /// Creation phase of `node`. Unmarked nodes report `NoPhase#0`.
    pub fn get_creation_phase(&self, node: NodeId) -> Result<PhaseId, TrackerError> {
        Ok(self.store.load(node)?.unwrap_or(PhaseId::NO_PHASE))
    }

    /// Creation phase of `node`. A store fault is logged and counted, and
    /// the node reads as `NoPhase#0`.
    pub fn creation_phase_or_unknown(&self, node: NodeId) -> PhaseId {
        self.get_creation_phase(node).unwrap_or_else(|e| {
            self.record_fault(&e);
            PhaseId::NO_PHASE
        })
    }

    /// Stamp every unmarked node in `nodes` with `phase`. Already-stamped
    /// nodes keep their stamp, so repeating a call changes nothing.
    pub fn stamp_unmarked<I>(&self, nodes: I, phase: PhaseId) -> StampOutcome
    where
        I: IntoIterator<Item = NodeId>,
    {
        let mut outcome = StampOutcome::default();
        for node in nodes {
            match self.store.store_if_unmarked(node, phase) {
                Ok(true) => outcome.stamped += 1,
                Ok(false) => outcome.already_marked += 1,
                Err(e) => {
                    self.record_fault(&e);
                    outcome.faults += 1;
                }
            }
        }
        outcome
    }

    /// Stamp `node` as deleted. Overwrites any creation stamp.
    pub fn mark_deleted(&self, node: NodeId) -> Result<(), TrackerError> {
        self.store.erase(node).inspect_err(|e| {
            self.record_fault(e);
        })
    }

    /// Store faults seen so far.
    pub fn faults(&self) -> u64 {
        self.faults.load(Ordering::Relaxed)
    }

    /// Stamped nodes, when the store can tell.
    pub fn stamped_nodes(&self) -> Option<usize> {
        self.store.len()
    }

    fn record_fault(&self, error: &TrackerError) {
        self.faults.fetch_add(1, Ordering::Relaxed);
        warn!(code = error.error_code(), "{error}");
    }
}

impl std::fmt::Debug for NodeProvenanceTracker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NodeProvenanceTracker")
            .field("faults", &self.faults())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use depmat_core::PhaseKindInterner;

    #[test]
    fn unmarked_node_reports_no_phase() {
        let tracker = NodeProvenanceTracker::with_side_table(8);
        assert_eq!(
            tracker.get_creation_phase(NodeId(7)).unwrap(),
            PhaseId::NO_PHASE
        );
    }

    #[test]
    fn deleted_overwrites_creation_stamp() {
        let kinds = PhaseKindInterner::new();
        let a0 = PhaseId::new(kinds.intern("A"), 0);
        let tracker = NodeProvenanceTracker::with_side_table(8);

        tracker.stamp_unmarked([NodeId(1)], a0);
        tracker.mark_deleted(NodeId(1)).unwrap();
        assert_eq!(
            tracker.get_creation_phase(NodeId(1)).unwrap(),
            PhaseId::DELETED_PHASE
        );

        let again = tracker.stamp_unmarked([NodeId(1)], a0);
        assert_eq!(again.already_marked, 1);
    }
}
