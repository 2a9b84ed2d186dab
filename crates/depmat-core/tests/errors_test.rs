//! Tests for error codes and operator strings.

use depmat_core::errors::{
    ConfigError, DepmatErrorCode, LifecycleError, ReportError, SinkError, StorageError,
    TrackerError,
};

#[test]
fn every_error_has_a_stable_code() {
    let tracker = TrackerError::Unreadable {
        node: 7,
        message: "annotation slot missing".into(),
    };
    assert_eq!(tracker.error_code(), "TRACKER_ERROR");

    let mismatch = LifecycleError::MismatchedExit {
        expected: "Canonicalize#0".into(),
        found: "Inline#0".into(),
    };
    assert_eq!(mismatch.error_code(), "LIFECYCLE_VIOLATION");
    assert_eq!(
        LifecycleError::UnknownUnit { owner: 3 }.error_code(),
        "UNKNOWN_UNIT"
    );

    assert_eq!(SinkError::Closed.error_code(), "SINK_CLOSED");
    let storage = SinkError::from(StorageError::SqliteError {
        message: "disk I/O error".into(),
    });
    assert_eq!(storage.error_code(), "STORAGE_ERROR");

    let config = ConfigError::FileNotFound {
        path: "depmat.toml".into(),
    };
    assert_eq!(config.error_code(), "CONFIG_ERROR");
    assert_eq!(ReportError::MissingSeparator.error_code(), "REPORT_ERROR");
}

#[test]
fn operator_string_prefixes_code() {
    let err = LifecycleError::ExitWithoutEnter {
        found: "Inline".into(),
    };
    assert_eq!(
        err.operator_string(),
        "[LIFECYCLE_VIOLATION] exiting phase Inline with an empty phase stack"
    );
}

#[test]
fn sink_io_error_keeps_source() {
    use std::error::Error;

    let err = SinkError::Io {
        path: "dumps/000001-unit.depmat".into(),
        source: std::io::Error::new(std::io::ErrorKind::PermissionDenied, "read-only"),
    };
    assert!(err.source().is_some());
    assert!(err.to_string().contains("dumps/000001-unit.depmat"));
}
