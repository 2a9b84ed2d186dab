//! Error handling for depmat.
//! One error enum per subsystem, `thiserror` only, zero `anyhow`.

pub mod config_error;
pub mod error_code;
pub mod lifecycle_error;
pub mod report_error;
pub mod sink_error;
pub mod storage_error;
pub mod tracker_error;

pub use config_error::ConfigError;
pub use error_code::DepmatErrorCode;
pub use lifecycle_error::LifecycleError;
pub use report_error::ReportError;
pub use sink_error::SinkError;
pub use storage_error::StorageError;
pub use tracker_error::TrackerError;
