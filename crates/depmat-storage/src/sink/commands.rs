//! Messages sent to the writer thread.

use crossbeam_channel::Sender;
use depmat_core::errors::SinkError;
use depmat_core::Snapshot;

pub enum SinkCommand {
    /// Write one finished snapshot.
    Persist(Snapshot),
    /// Flush the backend, then acknowledge. Everything queued before the
    /// flush has been handled when the ack arrives.
    Flush(Sender<Result<(), SinkError>>),
}
