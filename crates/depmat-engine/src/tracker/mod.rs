//! Node provenance: which phase created each node.

pub mod node_tracker;
pub mod store;

pub use node_tracker::{NodeProvenanceTracker, StampOutcome};
pub use store::{ProvenanceStore, SideTable};
