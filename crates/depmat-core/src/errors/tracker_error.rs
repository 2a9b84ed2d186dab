//! Node provenance tracker errors.

use super::error_code::{self, DepmatErrorCode};

/// Faults raised by a provenance store behind the tracker.
///
/// These are collaborator faults: the tracker reports them as values and
/// callers log and continue, counting the node as `NoPhase`.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TrackerError {
    #[error("provenance of node {node} is unreadable: {message}")]
    Unreadable { node: u64, message: String },

    #[error("provenance of node {node} could not be written: {message}")]
    Unwritable { node: u64, message: String },

    #[error("provenance store is inconsistent: {message}")]
    Inconsistent { message: String },
}

impl DepmatErrorCode for TrackerError {
    fn error_code(&self) -> &'static str {
        error_code::TRACKER_ERROR
    }
}
