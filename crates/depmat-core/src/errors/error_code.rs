//! DepmatErrorCode trait for operator-facing error reporting.

/// Trait for attaching a stable code to every depmat error.
/// Log lines and sink statistics carry the code so operators can grep for
/// a failure class without parsing messages.
pub trait DepmatErrorCode {
    /// Returns the error code string (e.g., "TRACKER_ERROR").
    fn error_code(&self) -> &'static str;

    /// Returns the formatted operator string: `[ERROR_CODE] message`.
    fn operator_string(&self) -> String
    where
        Self: std::fmt::Display,
    {
        format!("[{}] {}", self.error_code(), self)
    }
}

pub const TRACKER_ERROR: &str = "TRACKER_ERROR";
pub const LIFECYCLE_VIOLATION: &str = "LIFECYCLE_VIOLATION";
pub const UNKNOWN_UNIT: &str = "UNKNOWN_UNIT";
pub const SINK_ERROR: &str = "SINK_ERROR";
pub const SINK_CLOSED: &str = "SINK_CLOSED";
pub const SINK_QUEUE_FULL: &str = "SINK_QUEUE_FULL";
pub const STORAGE_ERROR: &str = "STORAGE_ERROR";
pub const CONFIG_ERROR: &str = "CONFIG_ERROR";
pub const REPORT_ERROR: &str = "REPORT_ERROR";
