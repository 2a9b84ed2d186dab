//! AsyncSnapshotSink: hands snapshots to a writer thread without blocking.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError, RwLock};
use std::thread::{self, JoinHandle};
use std::time::Instant;

use crossbeam_channel::{bounded, unbounded, Receiver, Sender, TrySendError};
use depmat_core::config::SinkConfig;
use depmat_core::errors::{DepmatErrorCode, SinkError};
use depmat_core::{Snapshot, SnapshotSink};
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, warn};

use super::commands::SinkCommand;
use crate::writer::{open_writer, SnapshotWriter};

/// Counters of the writer thread.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SinkStats {
    /// Snapshots written by the backend.
    pub persisted: u64,
    /// Snapshots the backend failed to write.
    pub failed: u64,
    /// Snapshots refused because the queue was full.
    pub rejected: u64,
    /// Bytes of snapshot text written.
    pub bytes: u64,
    pub flushes: u64,
}

#[derive(Debug, Default)]
struct SinkCounters {
    persisted: AtomicU64,
    failed: AtomicU64,
    rejected: AtomicU64,
    bytes: AtomicU64,
    flushes: AtomicU64,
}

impl SinkCounters {
    fn snapshot(&self) -> SinkStats {
        SinkStats {
            persisted: self.persisted.load(Ordering::Relaxed),
            failed: self.failed.load(Ordering::Relaxed),
            rejected: self.rejected.load(Ordering::Relaxed),
            bytes: self.bytes.load(Ordering::Relaxed),
            flushes: self.flushes.load(Ordering::Relaxed),
        }
    }
}

/// [`SnapshotSink`] backed by a dedicated writer thread.
///
/// `persist` only enqueues. With no capacity the queue is unbounded; with a
/// capacity a full queue rejects the snapshot with
/// [`SinkError::QueueFull`] instead of blocking the caller.
pub struct AsyncSnapshotSink {
    tx: RwLock<Option<Sender<SinkCommand>>>,
    handle: Mutex<Option<JoinHandle<()>>>,
    counters: Arc<SinkCounters>,
    capacity: Option<usize>,
    backend: String,
}

impl AsyncSnapshotSink {
    /// Start the writer thread around `writer`.
    pub fn new(
        writer: Box<dyn SnapshotWriter>,
        capacity: Option<usize>,
    ) -> Result<Self, SinkError> {
        let (tx, rx) = match capacity {
            Some(cap) => bounded(cap),
            None => unbounded(),
        };
        let counters = Arc::new(SinkCounters::default());
        let backend = writer.describe();
        let thread_counters = Arc::clone(&counters);
        let handle = thread::Builder::new()
            .name("depmat-sink".to_string())
            .spawn(move || writer_loop(writer, rx, &thread_counters))
            .map_err(|source| SinkError::Io {
                path: backend.clone(),
                source,
            })?;
        info!(backend = %backend, capacity = ?capacity, "snapshot sink started");
        Ok(Self {
            tx: RwLock::new(Some(tx)),
            handle: Mutex::new(Some(handle)),
            counters,
            capacity,
            backend,
        })
    }

    /// Open the backend named by `config` and start the writer thread.
    pub fn from_config(config: &SinkConfig) -> Result<Self, SinkError> {
        Self::new(open_writer(config)?, config.queue_capacity)
    }

    /// Wait until everything queued so far is written and the backend is
    /// flushed.
    pub fn flush(&self) -> Result<(), SinkError> {
        let (ack_tx, ack_rx) = bounded(1);
        // Sending to a full bounded queue blocks; never hold the lock here.
        let tx = self
            .tx
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
            .ok_or(SinkError::Closed)?;
        tx.send(SinkCommand::Flush(ack_tx))
            .map_err(|_| SinkError::Closed)?;
        drop(tx);
        ack_rx.recv().map_err(|_| SinkError::WriterPanicked)?
    }

    /// Stop accepting snapshots, drain the queue and join the writer thread.
    /// Later calls return [`SinkError::Closed`].
    pub fn close(&self) -> Result<SinkStats, SinkError> {
        let tx = self
            .tx
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        if tx.is_none() {
            return Err(SinkError::Closed);
        }
        drop(tx);
        let handle = self
            .handle
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        if let Some(handle) = handle {
            handle.join().map_err(|_| SinkError::WriterPanicked)?;
        }
        let stats = self.stats();
        info!(
            backend = %self.backend,
            persisted = stats.persisted,
            failed = stats.failed,
            rejected = stats.rejected,
            "snapshot sink closed"
        );
        Ok(stats)
    }

    /// [`close`](Self::close) for an owned sink.
    pub fn shutdown(self) -> Result<SinkStats, SinkError> {
        self.close()
    }

    pub fn stats(&self) -> SinkStats {
        self.counters.snapshot()
    }

    pub fn capacity(&self) -> Option<usize> {
        self.capacity
    }

    /// Description of the backend, e.g. `directory dumps`.
    pub fn backend(&self) -> &str {
        &self.backend
    }
}

impl SnapshotSink for AsyncSnapshotSink {
    fn persist(&self, snapshot: Snapshot) -> Result<(), SinkError> {
        let guard = self.tx.read().unwrap_or_else(PoisonError::into_inner);
        let tx = guard.as_ref().ok_or(SinkError::Closed)?;
        match tx.try_send(SinkCommand::Persist(snapshot)) {
            Ok(()) => Ok(()),
            Err(TrySendError::Full(_)) => {
                self.counters.rejected.fetch_add(1, Ordering::Relaxed);
                Err(SinkError::QueueFull {
                    capacity: self.capacity.unwrap_or_default(),
                })
            }
            Err(TrySendError::Disconnected(_)) => Err(SinkError::Closed),
        }
    }
}

impl Drop for AsyncSnapshotSink {
    fn drop(&mut self) {
        match self.close() {
            Ok(_) | Err(SinkError::Closed) => {}
            Err(e) => warn!(code = e.error_code(), "{e}"),
        }
    }
}

impl std::fmt::Debug for AsyncSnapshotSink {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AsyncSnapshotSink")
            .field("backend", &self.backend)
            .field("capacity", &self.capacity)
            .field("stats", &self.stats())
            .finish_non_exhaustive()
    }
}

fn writer_loop(
    mut writer: Box<dyn SnapshotWriter>,
    rx: Receiver<SinkCommand>,
    counters: &SinkCounters,
) {
    for command in rx {
        match command {
            SinkCommand::Persist(snapshot) => persist_one(writer.as_mut(), &snapshot, counters),
            SinkCommand::Flush(ack) => {
                let result = writer.flush();
                counters.flushes.fetch_add(1, Ordering::Relaxed);
                // The caller may have given up waiting.
                let _ = ack.send(result);
            }
        }
    }
    if let Err(e) = writer.flush() {
        error!(code = e.error_code(), backend = %writer.describe(), "final flush failed: {e}");
    }
    debug!(backend = %writer.describe(), "snapshot writer stopped");
}

fn persist_one(writer: &mut dyn SnapshotWriter, snapshot: &Snapshot, counters: &SinkCounters) {
    let started = Instant::now();
    match writer.write(snapshot) {
        Ok(()) => {
            counters.persisted.fetch_add(1, Ordering::Relaxed);
            counters
                .bytes
                .fetch_add(snapshot.byte_len() as u64, Ordering::Relaxed);
            debug!(
                unit_id = %snapshot.unit_id,
                unit_label = %snapshot.unit_label,
                persist_time_ms = started.elapsed().as_millis() as u64,
                "snapshot persisted"
            );
        }
        Err(e) => {
            counters.failed.fetch_add(1, Ordering::Relaxed);
            error!(
                unit_id = %snapshot.unit_id,
                code = e.error_code(),
                "failed to persist snapshot: {e}"
            );
        }
    }
}
