//! Errors reading a rendered snapshot back.

use super::error_code::{self, DepmatErrorCode};

/// Errors raised while parsing rendered matrix text.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ReportError {
    #[error("line {line}: malformed phase key {text:?}")]
    MalformedKey { line: usize, text: String },

    #[error("line {line}: malformed cell {text:?}")]
    MalformedCell { line: usize, text: String },

    #[error("missing blank line between header and grid")]
    MissingSeparator,

    #[error("grid has {found} rows/columns where the header declares {expected}")]
    DimensionMismatch { expected: usize, found: usize },

    #[error("unknown phase key {key}")]
    UnknownKey { key: String },
}

impl DepmatErrorCode for ReportError {
    fn error_code(&self) -> &'static str {
        error_code::REPORT_ERROR
    }
}
