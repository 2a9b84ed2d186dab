//! WorkUnitScope: registry of open units keyed by owner.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use depmat_core::config::MatrixConfig;
use depmat_core::errors::{DepmatErrorCode, LifecycleError};
use depmat_core::{PhaseKindInterner, SnapshotSink, UnitId};
use rustc_hash::FxBuildHasher;
use tracing::{debug, error, info, warn};

use super::owner::{OwnerRef, ScopeOwner};
use super::unit::WorkUnit;
use crate::stats::EngineStats;
use crate::tracker::ProvenanceStore;

struct ScopeEntry {
    owner: OwnerRef,
    unit: Arc<WorkUnit>,
}

/// Tracks the open work unit of every owner and closes units exactly once.
pub struct WorkUnitScope {
    kinds: Arc<PhaseKindInterner>,
    matrix_config: MatrixConfig,
    snapshot_name: String,
    shared_store: Option<Arc<dyn ProvenanceStore>>,
    sink: Arc<dyn SnapshotSink>,
    stats: Arc<EngineStats>,
    units: DashMap<u64, ScopeEntry, FxBuildHasher>,
    next_unit_id: AtomicU64,
}

impl WorkUnitScope {
    pub fn new(
        kinds: Arc<PhaseKindInterner>,
        matrix_config: MatrixConfig,
        snapshot_name: impl Into<String>,
        sink: Arc<dyn SnapshotSink>,
        shared_store: Option<Arc<dyn ProvenanceStore>>,
        stats: Arc<EngineStats>,
    ) -> Self {
        Self {
            kinds,
            matrix_config,
            snapshot_name: snapshot_name.into(),
            shared_store,
            sink,
            stats,
            units: DashMap::with_hasher(FxBuildHasher),
            next_unit_id: AtomicU64::new(1),
        }
    }

    /// Start a new unit for `owner`. Abandoned units are swept first. The
    /// new unit replaces the owner's slot in one step; whatever unit it
    /// displaces is finalized, including one a concurrent
    /// [`current_or_start`](Self::current_or_start) installed meanwhile.
    pub fn start(&self, owner: &ScopeOwner, label: impl Into<String>) -> Arc<WorkUnit> {
        self.sweep();
        let unit = self.new_unit(label.into());
        let entry = ScopeEntry {
            owner: owner.downgrade(),
            unit: Arc::clone(&unit),
        };
        let displaced = match self.units.entry(owner.id()) {
            Entry::Occupied(mut slot) => Some(std::mem::replace(slot.get_mut(), entry)),
            Entry::Vacant(slot) => {
                slot.insert(entry);
                None
            }
        };
        if let Some(previous) = displaced {
            debug!(
                unit_id = %previous.unit.id(),
                "finalizing previous unit of restarting owner"
            );
            self.finalize_unit(&previous.unit);
        }
        unit
    }

    /// The owner's open unit, if any.
    pub fn current(&self, owner: &ScopeOwner) -> Option<Arc<WorkUnit>> {
        self.units.get(&owner.id()).map(|e| Arc::clone(&e.unit))
    }

    /// The owner's open unit, starting one labelled `unit-<owner>` if none.
    pub fn current_or_start(&self, owner: &ScopeOwner) -> Arc<WorkUnit> {
        if let Some(unit) = self.current(owner) {
            return unit;
        }
        let entry = self.units.entry(owner.id()).or_insert_with(|| ScopeEntry {
            owner: owner.downgrade(),
            unit: self.new_unit(format!("unit-{}", owner.id())),
        });
        Arc::clone(&entry.unit)
    }

    /// Finalize the owner's unit and hand its snapshot to the sink.
    pub fn end(&self, owner: &ScopeOwner) -> Result<UnitId, LifecycleError> {
        let (_, entry) = self
            .units
            .remove(&owner.id())
            .ok_or(LifecycleError::UnknownUnit { owner: owner.id() })?;
        self.finalize_unit(&entry.unit);
        Ok(entry.unit.id())
    }

    /// Close the owner's unit without persisting it.
    pub fn discard(&self, owner: &ScopeOwner) -> bool {
        match self.units.remove(&owner.id()) {
            Some((_, entry)) => self.discard_unit(&entry.unit),
            None => false,
        }
    }

    /// Discard every unit whose owner is gone. Returns how many were pruned.
    pub fn sweep(&self) -> usize {
        let mut abandoned = Vec::new();
        self.units.retain(|_, entry| {
            if entry.owner.is_alive() {
                true
            } else {
                abandoned.push(Arc::clone(&entry.unit));
                false
            }
        });
        for unit in &abandoned {
            warn!(
                unit_id = %unit.id(),
                unit_label = unit.label(),
                "discarding abandoned work unit"
            );
            self.discard_unit(unit);
        }
        if !abandoned.is_empty() {
            debug!(swept_units = abandoned.len(), "swept abandoned units");
        }
        abandoned.len()
    }

    /// Close every registered unit: live owners' units are finalized,
    /// abandoned ones discarded. Returns how many were finalized.
    pub fn finalize_all(&self) -> usize {
        let owners: Vec<u64> = self.units.iter().map(|e| *e.key()).collect();
        let mut finalized = 0;
        for owner in owners {
            let Some((_, entry)) = self.units.remove(&owner) else {
                continue;
            };
            if entry.owner.is_alive() {
                if self.finalize_unit(&entry.unit) {
                    finalized += 1;
                }
            } else {
                self.discard_unit(&entry.unit);
            }
        }
        finalized
    }

    /// Number of registered units.
    pub fn active_units(&self) -> usize {
        self.units.len()
    }

    pub fn kinds(&self) -> &Arc<PhaseKindInterner> {
        &self.kinds
    }

    fn new_unit(&self, label: String) -> Arc<WorkUnit> {
        let id = UnitId(self.next_unit_id.fetch_add(1, Ordering::Relaxed));
        EngineStats::bump(&self.stats.units_started);
        debug!(unit_id = %id, unit_label = %label, "work unit started");
        Arc::new(WorkUnit::new(
            id,
            label,
            Arc::clone(&self.kinds),
            &self.matrix_config,
            self.shared_store.clone(),
        ))
    }

    /// Returns true if the unit's snapshot was handed to the sink.
    fn finalize_unit(&self, unit: &WorkUnit) -> bool {
        if unit.is_untrusted() {
            error!(
                unit_id = %unit.id(),
                unit_label = unit.label(),
                "discarding work unit after lifecycle violation"
            );
            self.discard_unit(unit);
            return false;
        }
        let Some(snapshot) = unit.finalize(&self.snapshot_name) else {
            return false;
        };
        EngineStats::bump(&self.stats.units_finalized);
        EngineStats::add(&self.stats.tracker_faults, unit.tracker().faults());

        let unit_id = snapshot.unit_id;
        let bytes = snapshot.byte_len();
        info!(
            unit_id = %unit_id,
            unit_label = unit.label(),
            elapsed_ms = unit.elapsed().as_millis() as u64,
            rows = unit.matrix().row_count(),
            skipped_writes = unit.matrix().skipped_writes(),
            bytes,
            "work unit finalized"
        );
        match self.sink.persist(snapshot) {
            Ok(()) => true,
            Err(e) => {
                EngineStats::bump(&self.stats.sink_failures);
                error!(
                    unit_id = %unit_id,
                    code = e.error_code(),
                    "failed to hand off snapshot: {e}"
                );
                false
            }
        }
    }

    fn discard_unit(&self, unit: &WorkUnit) -> bool {
        if !unit.discard() {
            return false;
        }
        EngineStats::bump(&self.stats.units_discarded);
        EngineStats::add(&self.stats.tracker_faults, unit.tracker().faults());
        true
    }
}

impl std::fmt::Debug for WorkUnitScope {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WorkUnitScope")
            .field("active_units", &self.active_units())
            .field("snapshot_name", &self.snapshot_name)
            .finish_non_exhaustive()
    }
}
