//! Snapshot sink errors.

use super::error_code::{self, DepmatErrorCode};
use super::StorageError;

/// Errors raised while handing off or persisting a snapshot.
#[derive(Debug, thiserror::Error)]
pub enum SinkError {
    #[error("I/O error writing {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("snapshot sink is closed")]
    Closed,

    #[error("snapshot queue is full ({capacity} pending)")]
    QueueFull { capacity: usize },

    #[error("snapshot writer thread panicked")]
    WriterPanicked,
}

impl DepmatErrorCode for SinkError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::Io { .. } | Self::WriterPanicked => error_code::SINK_ERROR,
            Self::Storage(e) => e.error_code(),
            Self::Closed => error_code::SINK_CLOSED,
            Self::QueueFull { .. } => error_code::SINK_QUEUE_FULL,
        }
    }
}
