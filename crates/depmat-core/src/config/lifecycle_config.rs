//! Lifecycle checking configuration.

use serde::{Deserialize, Serialize};

/// How lifecycle violations from the hook source are handled.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct LifecycleConfig {
    /// Panic on mismatched phase enter/exit instead of returning an error
    /// and distrusting the unit. Default: false.
    pub strict: Option<bool>,
}

impl LifecycleConfig {
    pub fn effective_strict(&self) -> bool {
        self.strict.unwrap_or(false)
    }
}
