//! Engine-wide counters.

use std::sync::atomic::{AtomicU64, Ordering};

use serde::{Deserialize, Serialize};

/// Live counters shared by the engine and its scope registry.
#[derive(Debug, Default)]
pub struct EngineStats {
    pub(crate) units_started: AtomicU64,
    pub(crate) units_finalized: AtomicU64,
    pub(crate) units_discarded: AtomicU64,
    pub(crate) phases_entered: AtomicU64,
    pub(crate) nodes_stamped: AtomicU64,
    pub(crate) skipped_writes: AtomicU64,
    pub(crate) tracker_faults: AtomicU64,
    pub(crate) lifecycle_violations: AtomicU64,
    pub(crate) sink_failures: AtomicU64,
}

/// Point-in-time copy of [`EngineStats`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineStatsSnapshot {
    pub units_started: u64,
    pub units_finalized: u64,
    pub units_discarded: u64,
    pub phases_entered: u64,
    pub nodes_stamped: u64,
    pub skipped_writes: u64,
    pub tracker_faults: u64,
    pub lifecycle_violations: u64,
    pub sink_failures: u64,
}

impl EngineStats {
    pub(crate) fn bump(counter: &AtomicU64) {
        counter.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn add(counter: &AtomicU64, n: u64) {
        if n > 0 {
            counter.fetch_add(n, Ordering::Relaxed);
        }
    }

    pub fn snapshot(&self) -> EngineStatsSnapshot {
        let load = |c: &AtomicU64| c.load(Ordering::Relaxed);
        EngineStatsSnapshot {
            units_started: load(&self.units_started),
            units_finalized: load(&self.units_finalized),
            units_discarded: load(&self.units_discarded),
            phases_entered: load(&self.phases_entered),
            nodes_stamped: load(&self.nodes_stamped),
            skipped_writes: load(&self.skipped_writes),
            tracker_faults: load(&self.tracker_faults),
            lifecycle_violations: load(&self.lifecycle_violations),
            sink_failures: load(&self.sink_failures),
        }
    }
}
