//! Per-unit phase stack and occurrence counters.
//!
//! Phases may nest, so the current phase is the top of a stack rather than
//! a single slot. Occurrence numbers count prior entries of the same kind
//! in the same unit, starting at 0.

use depmat_core::errors::LifecycleError;
use depmat_core::{KindId, PhaseKindInterner};
use rustc_hash::FxHashMap;
use smallvec::SmallVec;

use super::identity::{PhaseId, PhaseKind};

/// Phase nesting state for one work unit.
#[derive(Debug, Default)]
pub struct PhaseStack {
    active: SmallVec<[PhaseId; 8]>,
    entries: FxHashMap<KindId, u32>,
}

impl PhaseStack {
    pub fn new() -> Self {
        Self::default()
    }

    /// Enter a phase of `kind`. Returns its identity.
    pub fn enter(&mut self, kind: KindId) -> PhaseId {
        let count = self.entries.entry(kind).or_insert(0);
        let id = PhaseId::new(kind, *count);
        *count += 1;
        self.active.push(id);
        id
    }

    /// Exit a phase of `kind`. The top of the stack must be of that kind.
    /// The stack is left untouched on a mismatch.
    pub fn exit(
        &mut self,
        kind: KindId,
        kinds: &PhaseKindInterner,
    ) -> Result<PhaseId, LifecycleError> {
        let Some(&top) = self.active.last() else {
            return Err(LifecycleError::ExitWithoutEnter {
                found: kinds.resolve(kind).to_string(),
            });
        };
        if top.kind() != PhaseKind::Named(kind) {
            return Err(LifecycleError::MismatchedExit {
                expected: top.label(kinds).to_string(),
                found: kinds.resolve(kind).to_string(),
            });
        }
        self.active.pop();
        Ok(top)
    }

    /// The innermost active phase, if any.
    pub fn current(&self) -> Option<PhaseId> {
        self.active.last().copied()
    }

    pub fn depth(&self) -> usize {
        self.active.len()
    }

    /// Number of times `kind` has been entered in this unit.
    pub fn entries_of(&self, kind: KindId) -> u32 {
        self.entries.get(&kind).copied().unwrap_or(0)
    }
}
