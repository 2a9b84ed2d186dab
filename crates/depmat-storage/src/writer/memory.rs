//! In-memory backend for tests and embedders.

use std::sync::{Arc, Mutex, PoisonError};

use depmat_core::errors::SinkError;
use depmat_core::Snapshot;

use super::SnapshotWriter;

/// Shared handle to the snapshots a [`MemoryWriter`] received.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    snapshots: Arc<Mutex<Vec<Snapshot>>>,
}

impl MemoryStore {
    pub fn snapshots(&self) -> Vec<Snapshot> {
        self.snapshots
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn len(&self) -> usize {
        self.snapshots
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[derive(Debug, Default)]
pub struct MemoryWriter {
    store: MemoryStore,
}

impl MemoryWriter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Handle that stays readable after the writer moved to its thread.
    pub fn store(&self) -> MemoryStore {
        self.store.clone()
    }
}

impl SnapshotWriter for MemoryWriter {
    fn write(&mut self, snapshot: &Snapshot) -> Result<(), SinkError> {
        self.store
            .snapshots
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(snapshot.clone());
        Ok(())
    }

    fn describe(&self) -> String {
        "memory".to_string()
    }
}
