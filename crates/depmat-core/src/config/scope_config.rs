//! Work-unit scope configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::constants::DEFAULT_SWEEP_INTERVAL_MS;

/// Configuration for the work-unit registry and its sweeper.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct ScopeConfig {
    /// Interval between sweeps of abandoned units, in ms. Default: 1000.
    pub sweep_interval_ms: Option<u64>,
    /// Run the background sweeper at all. Default: true.
    pub background_sweep: Option<bool>,
}

impl ScopeConfig {
    /// Returns the effective sweep interval.
    pub fn effective_sweep_interval(&self) -> Duration {
        Duration::from_millis(self.sweep_interval_ms.unwrap_or(DEFAULT_SWEEP_INTERVAL_MS))
    }

    /// Returns whether the background sweeper runs, defaulting to true.
    pub fn effective_background_sweep(&self) -> bool {
        self.background_sweep.unwrap_or(true)
    }
}
