//! Tracing initialization and configuration.

use std::sync::Once;

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use crate::constants::{DEFAULT_LOG_FILTER, LOG_ENV_VAR};

static INIT: Once = Once::new();

/// Initialize the depmat tracing/logging system.
///
/// Reads the `DEPMAT_LOG` environment variable for per-crate log levels.
/// Format: `DEPMAT_LOG=depmat_engine=debug,depmat_storage=warn`
///
/// Falls back to `depmat=info` if `DEPMAT_LOG` is not set or is invalid.
/// Safe to call more than once. A host that already installed a global
/// subscriber keeps it.
pub fn init_tracing() {
    INIT.call_once(|| {
        let filter = EnvFilter::try_from_env(LOG_ENV_VAR)
            .unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));

        let _ = tracing_subscriber::registry()
            .with(
                fmt::layer()
                    .with_target(true)
                    .with_thread_ids(true)
                    .with_file(true)
                    .with_line_number(true),
            )
            .with(filter)
            .try_init();
    });
}
