//! Reading rendered snapshots back and answering questions about them.

pub mod aggregate;
pub mod parse;
pub mod query;

pub use aggregate::{aggregate, aggregate_mapped, by_kind};
pub use parse::ParsedSnapshot;
pub use query::Producer;
