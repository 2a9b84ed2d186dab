//! Shared value types.

pub mod identifiers;
pub mod interning;
pub mod snapshot;

pub use identifiers::{KindId, NodeId, UnitId};
pub use interning::{normalize_kind_name, PhaseKindInterner};
pub use snapshot::Snapshot;
