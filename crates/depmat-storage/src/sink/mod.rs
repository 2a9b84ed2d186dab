//! Snapshot sink: unbounded (or bounded) crossbeam channel, dedicated
//! writer thread.

pub mod commands;
pub mod writer;

pub use commands::SinkCommand;
pub use writer::{AsyncSnapshotSink, SinkStats};
