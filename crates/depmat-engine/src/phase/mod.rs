//! Phase identities and the per-unit phase stack.

pub mod identity;
pub mod stack;

pub use identity::{PhaseId, PhaseKind, PhaseLabel};
pub use stack::PhaseStack;
