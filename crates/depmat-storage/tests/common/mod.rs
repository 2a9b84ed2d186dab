//! Shared snapshot fixtures and test backends.

#![allow(dead_code)]

use std::time::Duration;

use crossbeam_channel::{Receiver, Sender};
use depmat_core::errors::SinkError;
use depmat_core::{Snapshot, UnitId};
use depmat_storage::SnapshotWriter;

pub fn snapshot(unit: u64, label: &str) -> Snapshot {
    Snapshot {
        unit_id: UnitId(unit),
        unit_label: label.to_string(),
        name: "depmat".to_string(),
        text: format!("NoPhase#0\nDeletedPhase#0\nA#{unit}\n\n0:0:0 0:0:0 0:0:0\n0:0:0 0:0:0 0:0:0\n1:1:1 0:0:0 0:0:0\n"),
        started_at_ms: 1_700_000_000_000 + unit,
        duration: Duration::from_millis(12),
    }
}

/// Announces each write on `started`, then waits for one token on `gate`.
pub struct GateWriter {
    pub started: Sender<u64>,
    pub gate: Receiver<()>,
}

impl SnapshotWriter for GateWriter {
    fn write(&mut self, snapshot: &Snapshot) -> Result<(), SinkError> {
        let _ = self.started.send(snapshot.unit_id.get());
        let _ = self.gate.recv();
        Ok(())
    }

    fn describe(&self) -> String {
        "gate".to_string()
    }
}

/// Fails every write.
pub struct BrokenWriter;

impl SnapshotWriter for BrokenWriter {
    fn write(&mut self, _snapshot: &Snapshot) -> Result<(), SinkError> {
        Err(SinkError::Io {
            path: "broken".to_string(),
            source: std::io::Error::other("disk detached"),
        })
    }

    fn describe(&self) -> String {
        "broken".to_string()
    }
}

/// Panics on the first write.
pub struct PanickingWriter;

impl SnapshotWriter for PanickingWriter {
    fn write(&mut self, _snapshot: &Snapshot) -> Result<(), SinkError> {
        panic!("writer bug");
    }

    fn describe(&self) -> String {
        "panicking".to_string()
    }
}
