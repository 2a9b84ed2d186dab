//! # depmat-engine
//!
//! Per-unit phase identities, node provenance stamps, and the concurrent
//! provenance matrix. A [`ProvenanceEngine`] receives hook events from the
//! host pipeline, updates the matrix of the caller's work unit, and hands
//! the rendered matrix to a [`depmat_core::SnapshotSink`] when the unit
//! ends.

pub mod engine;
pub mod matrix;
pub mod phase;
pub mod report;
pub mod scope;
pub mod stats;
pub mod tracker;

pub use engine::{EngineBuilder, ProvenanceEngine};
pub use matrix::{CellValue, ProvenanceMatrix};
pub use phase::{PhaseId, PhaseKind, PhaseStack};
pub use report::ParsedSnapshot;
pub use scope::{ScopeOwner, WorkUnit, WorkUnitScope};
pub use stats::{EngineStats, EngineStatsSnapshot};
pub use tracker::{NodeProvenanceTracker, ProvenanceStore, SideTable};
