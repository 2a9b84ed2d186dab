//! # depmat-core
//!
//! Foundation crate for the depmat provenance profiler.
//! Defines identifiers, the snapshot sink boundary, errors, config, tracing,
//! and constants. The engine and storage crates both depend on this.

pub mod config;
pub mod constants;
pub mod errors;
pub mod tracing;
pub mod traits;
pub mod types;

pub use config::DepmatConfig;
pub use errors::DepmatErrorCode;
pub use traits::SnapshotSink;
pub use types::{KindId, NodeId, PhaseKindInterner, Snapshot, UnitId};
