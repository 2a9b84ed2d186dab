//! Phase identity: a phase kind plus its occurrence number within a unit.

use std::fmt;

use depmat_core::constants::{
    DELETED_PHASE_NAME, NO_PHASE_NAME, OCCURRENCE_SEPARATOR, SENTINEL_OCCURRENCE,
};
use depmat_core::{KindId, PhaseKindInterner};

/// What kind of phase produced or consumed a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PhaseKind {
    /// The node existed before any tracked phase ran.
    NoPhase,
    /// The node was removed from the graph.
    DeletedPhase,
    /// A phase reported by the hook source.
    Named(KindId),
}

/// Identity of one phase execution within a work unit.
///
/// Two identities are equal iff kind and occurrence are equal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PhaseId {
    kind: PhaseKind,
    occurrence: u32,
}

impl PhaseId {
    pub const NO_PHASE: PhaseId = PhaseId {
        kind: PhaseKind::NoPhase,
        occurrence: SENTINEL_OCCURRENCE,
    };

    pub const DELETED_PHASE: PhaseId = PhaseId {
        kind: PhaseKind::DeletedPhase,
        occurrence: SENTINEL_OCCURRENCE,
    };

    pub fn new(kind: KindId, occurrence: u32) -> Self {
        Self {
            kind: PhaseKind::Named(kind),
            occurrence,
        }
    }

    pub fn kind(&self) -> PhaseKind {
        self.kind
    }

    pub fn occurrence(&self) -> u32 {
        self.occurrence
    }

    /// True for `NoPhase#0` and `DeletedPhase#0`.
    pub fn is_sentinel(&self) -> bool {
        !matches!(self.kind, PhaseKind::Named(_))
    }

    /// Name of the kind, resolved through `kinds`.
    pub fn kind_name<'a>(&self, kinds: &'a PhaseKindInterner) -> &'a str {
        match self.kind {
            PhaseKind::NoPhase => NO_PHASE_NAME,
            PhaseKind::DeletedPhase => DELETED_PHASE_NAME,
            PhaseKind::Named(id) => kinds.resolve(id),
        }
    }

    /// Renders as `<kind>#<occurrence>`.
    pub fn label<'a>(&self, kinds: &'a PhaseKindInterner) -> PhaseLabel<'a> {
        PhaseLabel { id: *self, kinds }
    }
}

/// Display adapter for a [`PhaseId`].
pub struct PhaseLabel<'a> {
    id: PhaseId,
    kinds: &'a PhaseKindInterner,
}

impl fmt::Display for PhaseLabel<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}{}{}",
            self.id.kind_name(self.kinds),
            OCCURRENCE_SEPARATOR,
            self.id.occurrence
        )
    }
}
