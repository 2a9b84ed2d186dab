//! Phase-kind interning.
//!
//! Hook sources name phases with strings (usually a pass's type name).
//! Interning them once with `lasso::ThreadedRodeo` makes matrix keys
//! `Copy` and cheap to hash on the per-node hot path.

use std::borrow::Cow;

use lasso::ThreadedRodeo;

use super::identifiers::KindId;
use crate::constants::{DELETED_PHASE_NAME, NO_PHASE_NAME};

/// Canonical form of a host-supplied phase-kind name.
///
/// Surrounding whitespace is trimmed; interior whitespace and control
/// characters become `_`; an empty name becomes `_`. The sentinel names
/// `NoPhase` and `DeletedPhase` are reserved: a host kind spelled the same
/// gets a trailing `_`.
pub fn normalize_kind_name(name: &str) -> Cow<'_, str> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Cow::Borrowed("_");
    }
    let mut normalized = if trimmed.chars().any(|c| c.is_whitespace() || c.is_control()) {
        Cow::Owned(
            trimmed
                .chars()
                .map(|c| if c.is_whitespace() || c.is_control() { '_' } else { c })
                .collect(),
        )
    } else {
        Cow::Borrowed(trimmed)
    };
    if normalized == NO_PHASE_NAME || normalized == DELETED_PHASE_NAME {
        normalized.to_mut().push('_');
    }
    normalized
}

/// Thread-safe interner for phase-kind names.
pub struct PhaseKindInterner {
    inner: ThreadedRodeo,
}

impl PhaseKindInterner {
    pub fn new() -> Self {
        Self {
            inner: ThreadedRodeo::default(),
        }
    }

    /// Intern a phase-kind name, normalized by [`normalize_kind_name`] so
    /// every rendered key stays one whitespace-free header line.
    pub fn intern(&self, name: &str) -> KindId {
        KindId(self.inner.get_or_intern(normalize_kind_name(name)))
    }

    /// Look up a previously interned name without inserting.
    pub fn get(&self, name: &str) -> Option<KindId> {
        self.inner.get(normalize_kind_name(name)).map(KindId)
    }

    /// Resolve a `KindId` back to its name.
    pub fn resolve(&self, id: KindId) -> &str {
        self.inner.resolve(&id.0)
    }

    /// Number of distinct kinds seen so far.
    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }
}

impl Default for PhaseKindInterner {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for PhaseKindInterner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PhaseKindInterner")
            .field("len", &self.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn interior_whitespace_is_replaced() {
        assert_eq!(normalize_kind_name("  Loop Unroll "), "Loop_Unroll");
        assert_eq!(normalize_kind_name("Split\nPhase"), "Split_Phase");
        assert_eq!(normalize_kind_name("Tab\tbed\u{7}"), "Tab_bed_");
        assert_eq!(normalize_kind_name(" \n "), "_");
        assert!(matches!(normalize_kind_name("GVN"), Cow::Borrowed("GVN")));
    }

    #[test]
    fn sentinel_names_are_reserved() {
        assert_eq!(normalize_kind_name("NoPhase"), "NoPhase_");
        assert_eq!(normalize_kind_name(" DeletedPhase"), "DeletedPhase_");
        assert_eq!(normalize_kind_name("NoPhases"), "NoPhases");
    }

    #[test]
    fn lookups_use_the_normalized_name() {
        let kinds = PhaseKindInterner::new();
        let id = kinds.intern("Loop Unroll");
        assert_eq!(kinds.resolve(id), "Loop_Unroll");
        assert_eq!(kinds.get("Loop\tUnroll"), Some(id));
        assert_eq!(kinds.intern("Loop_Unroll"), id);
    }
}
