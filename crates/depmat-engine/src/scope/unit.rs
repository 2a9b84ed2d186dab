//! WorkUnit: one unit of work's matrix, tracker, and phase stack.

use std::sync::atomic::{AtomicBool, AtomicU8, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};

use depmat_core::config::MatrixConfig;
use depmat_core::errors::LifecycleError;
use depmat_core::{KindId, PhaseKindInterner, Snapshot, UnitId};

use crate::matrix::ProvenanceMatrix;
use crate::phase::{PhaseId, PhaseStack};
use crate::tracker::{NodeProvenanceTracker, ProvenanceStore};

const OPEN: u8 = 0;
const FINALIZED: u8 = 1;
const DISCARDED: u8 = 2;

/// How a unit was closed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnitState {
    Open,
    Finalized,
    Discarded,
}

pub struct WorkUnit {
    id: UnitId,
    label: String,
    started_at_ms: u64,
    started: Instant,
    matrix: ProvenanceMatrix,
    tracker: NodeProvenanceTracker,
    phases: Mutex<PhaseStack>,
    state: AtomicU8,
    untrusted: AtomicBool,
}

impl WorkUnit {
    pub fn new(
        id: UnitId,
        label: String,
        kinds: Arc<PhaseKindInterner>,
        config: &MatrixConfig,
        store: Option<Arc<dyn ProvenanceStore>>,
    ) -> Self {
        let tracker = match store {
            Some(store) => NodeProvenanceTracker::new(store),
            None => NodeProvenanceTracker::with_side_table(config.effective_initial_capacity()),
        };
        Self {
            id,
            label,
            started_at_ms: SystemTime::now()
                .duration_since(UNIX_EPOCH)
                .map(|d| d.as_millis() as u64)
                .unwrap_or(0),
            started: Instant::now(),
            matrix: ProvenanceMatrix::new(kinds, config),
            tracker,
            phases: Mutex::new(PhaseStack::new()),
            state: AtomicU8::new(OPEN),
            untrusted: AtomicBool::new(false),
        }
    }

    pub fn id(&self) -> UnitId {
        self.id
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn matrix(&self) -> &ProvenanceMatrix {
        &self.matrix
    }

    pub fn tracker(&self) -> &NodeProvenanceTracker {
        &self.tracker
    }

    pub fn elapsed(&self) -> Duration {
        self.started.elapsed()
    }

    pub fn state(&self) -> UnitState {
        match self.state.load(Ordering::Acquire) {
            OPEN => UnitState::Open,
            FINALIZED => UnitState::Finalized,
            _ => UnitState::Discarded,
        }
    }

    pub fn is_open(&self) -> bool {
        self.state() == UnitState::Open
    }

    /// Set after a lifecycle violation. An untrusted unit is discarded
    /// instead of persisted.
    pub fn is_untrusted(&self) -> bool {
        self.untrusted.load(Ordering::Acquire)
    }

    pub fn mark_untrusted(&self) {
        self.untrusted.store(true, Ordering::Release);
    }

    pub fn enter_phase(&self, kind: KindId) -> PhaseId {
        self.phases
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .enter(kind)
    }

    pub fn exit_phase(&self, kind: KindId) -> Result<PhaseId, LifecycleError> {
        self.phases
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .exit(kind, self.matrix.kinds())
    }

    /// The innermost phase running in this unit.
    pub fn current_phase(&self) -> Option<PhaseId> {
        self.phases
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .current()
    }

    /// Seal and render the matrix. Only the first close of a unit (finalize
    /// or discard) succeeds; later calls return `None`.
    pub fn finalize(&self, snapshot_name: &str) -> Option<Snapshot> {
        if !self.close(FINALIZED) {
            return None;
        }
        let text = self.matrix.seal_and_render()?;
        Some(Snapshot {
            unit_id: self.id,
            unit_label: self.label.clone(),
            name: snapshot_name.to_string(),
            text,
            started_at_ms: self.started_at_ms,
            duration: self.elapsed(),
        })
    }

    /// Seal without rendering. Returns false if the unit was already closed.
    pub fn discard(&self) -> bool {
        if !self.close(DISCARDED) {
            return false;
        }
        self.matrix.seal();
        true
    }

    fn close(&self, to: u8) -> bool {
        self.state
            .compare_exchange(OPEN, to, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
    }
}

impl std::fmt::Debug for WorkUnit {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WorkUnit")
            .field("id", &self.id)
            .field("label", &self.label)
            .field("state", &self.state())
            .field("untrusted", &self.is_untrusted())
            .field("matrix", &self.matrix)
            .finish()
    }
}
