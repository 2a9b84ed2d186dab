//! Snapshot sink configuration.

use std::path::PathBuf;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::constants::{DEFAULT_OUTPUT_DIR, DEFAULT_SNAPSHOT_NAME};
use crate::errors::ConfigError;

/// Backend that receives rendered snapshots.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum SinkKind {
    /// One file per snapshot under `output_dir`.
    #[default]
    Directory,
    /// Rows in a SQLite database under `output_dir`.
    Sqlite,
    /// Kept in memory; used by tests and embedders.
    Memory,
}

impl FromStr for SinkKind {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "directory" | "dir" => Ok(Self::Directory),
            "sqlite" => Ok(Self::Sqlite),
            "memory" => Ok(Self::Memory),
            other => Err(ConfigError::InvalidValue {
                field: "sink.kind".to_string(),
                message: format!("unknown sink kind '{other}'"),
            }),
        }
    }
}

/// Configuration for snapshot persistence.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct SinkConfig {
    /// Backend kind. Default: directory.
    pub kind: Option<SinkKind>,
    /// Output directory. Default: `dumps`.
    pub output_dir: Option<PathBuf>,
    /// Bound of the hand-off queue. Unset means unbounded, so a stalled
    /// writer never back-pressures the host pipeline.
    pub queue_capacity: Option<usize>,
    /// Name each snapshot is persisted under. Default: `depmat`.
    pub snapshot_name: Option<String>,
}

impl SinkConfig {
    pub fn effective_kind(&self) -> SinkKind {
        self.kind.unwrap_or_default()
    }

    pub fn effective_output_dir(&self) -> PathBuf {
        self.output_dir
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_OUTPUT_DIR))
    }

    pub fn effective_snapshot_name(&self) -> &str {
        self.snapshot_name.as_deref().unwrap_or(DEFAULT_SNAPSHOT_NAME)
    }
}
