//! Provenance matrix configuration.

use serde::{Deserialize, Serialize};

use crate::constants::DEFAULT_MATRIX_CAPACITY;

/// Configuration for per-unit provenance matrices.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct MatrixConfig {
    /// Initial capacity of the row and cell maps. Default: 64.
    pub initial_capacity: Option<usize>,
    /// Pre-seed `NoPhase` and `DeletedPhase` into the key order. Default: true.
    pub seed_sentinels: Option<bool>,
}

impl MatrixConfig {
    /// Returns the effective initial capacity, defaulting to 64.
    pub fn effective_initial_capacity(&self) -> usize {
        self.initial_capacity.unwrap_or(DEFAULT_MATRIX_CAPACITY)
    }

    /// Returns whether sentinel keys are seeded, defaulting to true.
    pub fn effective_seed_sentinels(&self) -> bool {
        self.seed_sentinels.unwrap_or(true)
    }
}
