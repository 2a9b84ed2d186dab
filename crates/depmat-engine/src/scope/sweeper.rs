//! Background thread that prunes abandoned units on an interval.

use std::sync::{Arc, Weak};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use crossbeam_channel::{bounded, RecvTimeoutError, Sender};
use tracing::{debug, trace};

use super::registry::WorkUnitScope;

/// Runs [`WorkUnitScope::sweep`] every `interval` until stopped or the
/// scope is dropped.
pub struct Sweeper {
    stop: Option<Sender<()>>,
    handle: Option<JoinHandle<()>>,
}

impl Sweeper {
    pub fn spawn(scope: &Arc<WorkUnitScope>, interval: Duration) -> std::io::Result<Self> {
        let scope: Weak<WorkUnitScope> = Arc::downgrade(scope);
        let (stop_tx, stop_rx) = bounded::<()>(1);
        let handle = thread::Builder::new()
            .name("depmat-sweeper".to_string())
            .spawn(move || loop {
                match stop_rx.recv_timeout(interval) {
                    Err(RecvTimeoutError::Timeout) => {
                        let Some(scope) = scope.upgrade() else {
                            break;
                        };
                        let swept = scope.sweep();
                        trace!(swept_units = swept, "periodic sweep");
                    }
                    Ok(()) | Err(RecvTimeoutError::Disconnected) => break,
                }
            })?;
        debug!(interval_ms = interval.as_millis() as u64, "sweeper started");
        Ok(Self {
            stop: Some(stop_tx),
            handle: Some(handle),
        })
    }

    /// Stop the thread and wait for it to exit.
    pub fn stop(mut self) {
        self.shutdown();
    }

    fn shutdown(&mut self) {
        // Dropping the sender disconnects the channel and wakes the thread.
        self.stop.take();
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

impl Drop for Sweeper {
    fn drop(&mut self) {
        self.shutdown();
    }
}

impl std::fmt::Debug for Sweeper {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Sweeper")
            .field("running", &self.handle.is_some())
            .finish()
    }
}
