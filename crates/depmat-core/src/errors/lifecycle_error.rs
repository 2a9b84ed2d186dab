//! Lifecycle violations reported by the hook source.

use super::error_code::{self, DepmatErrorCode};

/// Mismatched phase or unit events.
///
/// These indicate the instrumentation's entry/exit events are out of step,
/// which makes all telemetry of the affected unit untrustworthy.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LifecycleError {
    #[error("exiting phase {found} while {expected} is on top of the phase stack")]
    MismatchedExit { expected: String, found: String },

    #[error("exiting phase {found} with an empty phase stack")]
    ExitWithoutEnter { found: String },

    #[error("no active work unit for owner {owner}")]
    UnknownUnit { owner: u64 },
}

impl DepmatErrorCode for LifecycleError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::MismatchedExit { .. } | Self::ExitWithoutEnter { .. } => {
                error_code::LIFECYCLE_VIOLATION
            }
            Self::UnknownUnit { .. } => error_code::UNKNOWN_UNIT,
        }
    }
}
