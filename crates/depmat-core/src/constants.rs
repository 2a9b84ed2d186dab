//! Compiled defaults shared across the workspace.

/// Initial capacity of row and cell maps. The default of 16 does not fit
/// even trivial compilations.
pub const DEFAULT_MATRIX_CAPACITY: usize = 64;

/// Interval between two sweeps of abandoned work units, in milliseconds.
pub const DEFAULT_SWEEP_INTERVAL_MS: u64 = 1_000;

/// Name under which a rendered matrix is persisted.
pub const DEFAULT_SNAPSHOT_NAME: &str = "depmat";

/// Directory used by the directory sink when none is configured.
pub const DEFAULT_OUTPUT_DIR: &str = "dumps";

/// Project-level config file looked up in the project root.
pub const PROJECT_CONFIG_FILE: &str = "depmat.toml";

/// Environment variable holding the tracing filter.
pub const LOG_ENV_VAR: &str = "DEPMAT_LOG";

/// Filter used when `DEPMAT_LOG` is unset or invalid.
pub const DEFAULT_LOG_FILTER: &str = "depmat=info";

/// Textual name of the "creation site unknown" sentinel kind.
pub const NO_PHASE_NAME: &str = "NoPhase";

/// Textual name of the "creation record discarded by the host" sentinel kind.
pub const DELETED_PHASE_NAME: &str = "DeletedPhase";

/// Occurrence number both sentinels render with.
pub const SENTINEL_OCCURRENCE: u32 = 0;

/// Separator between kind and occurrence in a rendered phase key.
pub const OCCURRENCE_SEPARATOR: char = '#';

/// Separator between the three counters of a rendered cell.
pub const CELL_SEPARATOR: char = ':';
