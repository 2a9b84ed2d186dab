//! ProvenanceStore trait and the default side-table implementation.
//!
//! Hosts that can attach a field to their own node objects implement
//! `ProvenanceStore` over that field. Everyone else uses `SideTable`, a
//! concurrent map keyed by node identity.

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use depmat_core::errors::TrackerError;
use depmat_core::NodeId;
use rustc_hash::FxBuildHasher;

use crate::phase::PhaseId;

/// Backing storage for node creation stamps.
///
/// An absent stamp means the node is unmarked (`NoPhase`). Implementations
/// report collaborator faults as `TrackerError` values; they must not panic.
pub trait ProvenanceStore: Send + Sync {
    /// Read the stamp of `node`.
    fn load(&self, node: NodeId) -> Result<Option<PhaseId>, TrackerError>;

    /// Overwrite the stamp of `node`.
    fn store(&self, node: NodeId, phase: PhaseId) -> Result<(), TrackerError>;

    /// Stamp `node` with `phase` only if it is unmarked. Returns whether the
    /// stamp was written.
    ///
    /// The default is a load followed by a store; stores that can do better
    /// should make this atomic.
    fn store_if_unmarked(&self, node: NodeId, phase: PhaseId) -> Result<bool, TrackerError> {
        match self.load(node)? {
            None | Some(PhaseId::NO_PHASE) => {
                self.store(node, phase)?;
                Ok(true)
            }
            Some(_) => Ok(false),
        }
    }

    /// Record that the host discarded the creation record of `node`.
    /// Later reads report `DeletedPhase`.
    fn erase(&self, node: NodeId) -> Result<(), TrackerError> {
        self.store(node, PhaseId::DELETED_PHASE)
    }

    /// Number of stamped nodes, when the store can tell.
    fn len(&self) -> Option<usize> {
        None
    }
}

/// Concurrent side table from node identity to creation stamp.
#[derive(Debug)]
pub struct SideTable {
    stamps: DashMap<NodeId, PhaseId, FxBuildHasher>,
}

impl SideTable {
    pub fn new() -> Self {
        Self::with_capacity(0)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            stamps: DashMap::with_capacity_and_hasher(capacity, FxBuildHasher),
        }
    }

    /// Drop every stamp.
    pub fn clear(&self) {
        self.stamps.clear();
    }
}

impl Default for SideTable {
    fn default() -> Self {
        Self::new()
    }
}

impl ProvenanceStore for SideTable {
    fn load(&self, node: NodeId) -> Result<Option<PhaseId>, TrackerError> {
        Ok(self.stamps.get(&node).map(|r| *r))
    }

    fn store(&self, node: NodeId, phase: PhaseId) -> Result<(), TrackerError> {
        self.stamps.insert(node, phase);
        Ok(())
    }

    fn store_if_unmarked(&self, node: NodeId, phase: PhaseId) -> Result<bool, TrackerError> {
        match self.stamps.entry(node) {
            Entry::Vacant(v) => {
                v.insert(phase);
                Ok(true)
            }
            Entry::Occupied(mut o) if *o.get() == PhaseId::NO_PHASE => {
                o.insert(phase);
                Ok(true)
            }
            Entry::Occupied(_) => Ok(false),
        }
    }

    fn len(&self) -> Option<usize> {
        Some(self.stamps.len())
    }
}
