//! Work-unit scoping: which matrix the calling context writes to.
//!
//! Each owner has at most one open unit. Starting a unit finalizes the
//! owner's previous one; units whose owner was dropped are discarded by the
//! next start or by the periodic sweeper.

pub mod owner;
pub mod registry;
pub mod sweeper;
pub mod unit;

pub use owner::ScopeOwner;
pub use registry::WorkUnitScope;
pub use sweeper::Sweeper;
pub use unit::{UnitState, WorkUnit};
