//! Top-level depmat configuration with layered resolution.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use super::{LifecycleConfig, MatrixConfig, ScopeConfig, SinkConfig, SinkKind};
use crate::constants::PROJECT_CONFIG_FILE;
use crate::errors::ConfigError;

/// Top-level configuration aggregating all sub-configs.
///
/// Resolution order (highest priority first):
/// 1. Explicit overrides (applied via `apply_overrides`)
/// 2. Environment variables (`DEPMAT_*`)
/// 3. Project config (`depmat.toml` in the project root)
/// 4. Compiled defaults
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct DepmatConfig {
    pub matrix: MatrixConfig,
    pub scope: ScopeConfig,
    pub sink: SinkConfig,
    pub lifecycle: LifecycleConfig,
}

/// Explicit overrides supplied by the embedding host.
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub sink_kind: Option<SinkKind>,
    pub output_dir: Option<PathBuf>,
    pub queue_capacity: Option<usize>,
    pub strict_lifecycle: Option<bool>,
}

impl DepmatConfig {
    /// Load configuration with layered resolution rooted at `root`.
    pub fn load(root: &Path, overrides: Option<&ConfigOverrides>) -> Result<Self, ConfigError> {
        let mut config = Self::default();

        let project_config_path = root.join(PROJECT_CONFIG_FILE);
        if project_config_path.exists() {
            Self::merge_toml_file(&mut config, &project_config_path)?;
        }

        Self::apply_env_overrides(&mut config);

        if let Some(overrides) = overrides {
            Self::apply_overrides(&mut config, overrides);
        }

        Self::validate(&config)?;

        Ok(config)
    }

    /// Load configuration from a TOML string (for testing).
    pub fn from_toml(toml_str: &str) -> Result<Self, ConfigError> {
        toml::from_str(toml_str).map_err(|e| ConfigError::ParseError {
            path: "<string>".to_string(),
            message: e.to_string(),
        })
    }

    /// Validate the configuration values.
    pub fn validate(config: &DepmatConfig) -> Result<(), ConfigError> {
        if config.matrix.initial_capacity == Some(0) {
            return Err(ConfigError::ValidationFailed {
                field: "matrix.initial_capacity".to_string(),
                message: "must be greater than 0".to_string(),
            });
        }
        if config.scope.sweep_interval_ms == Some(0) {
            return Err(ConfigError::ValidationFailed {
                field: "scope.sweep_interval_ms".to_string(),
                message: "must be greater than 0".to_string(),
            });
        }
        if config.sink.queue_capacity == Some(0) {
            return Err(ConfigError::ValidationFailed {
                field: "sink.queue_capacity".to_string(),
                message: "must be greater than 0; leave unset for an unbounded queue".to_string(),
            });
        }
        if let Some(ref name) = config.sink.snapshot_name {
            if name.trim().is_empty() || name.contains(['/', '\\']) {
                return Err(ConfigError::ValidationFailed {
                    field: "sink.snapshot_name".to_string(),
                    message: "must be a non-empty name without path separators".to_string(),
                });
            }
        }
        Ok(())
    }

    /// Merge a TOML file into the existing config.
    /// Unknown keys are silently ignored (forward-compatible).
    fn merge_toml_file(config: &mut DepmatConfig, path: &Path) -> Result<(), ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|_| ConfigError::FileNotFound {
            path: path.display().to_string(),
        })?;

        let file_config: DepmatConfig =
            toml::from_str(&content).map_err(|e| ConfigError::ParseError {
                path: path.display().to_string(),
                message: e.to_string(),
            })?;

        Self::merge(config, &file_config);
        Ok(())
    }

    /// Merge `other` into `base`, where `other` values override `base` values
    /// only when `other` has a `Some` value.
    fn merge(base: &mut DepmatConfig, other: &DepmatConfig) {
        // Matrix
        if other.matrix.initial_capacity.is_some() {
            base.matrix.initial_capacity = other.matrix.initial_capacity;
        }
        if other.matrix.seed_sentinels.is_some() {
            base.matrix.seed_sentinels = other.matrix.seed_sentinels;
        }

        // Scope
        if other.scope.sweep_interval_ms.is_some() {
            base.scope.sweep_interval_ms = other.scope.sweep_interval_ms;
        }
        if other.scope.background_sweep.is_some() {
            base.scope.background_sweep = other.scope.background_sweep;
        }

        // Sink
        if other.sink.kind.is_some() {
            base.sink.kind = other.sink.kind;
        }
        if other.sink.output_dir.is_some() {
            base.sink.output_dir = other.sink.output_dir.clone();
        }
        if other.sink.queue_capacity.is_some() {
            base.sink.queue_capacity = other.sink.queue_capacity;
        }
        if other.sink.snapshot_name.is_some() {
            base.sink.snapshot_name = other.sink.snapshot_name.clone();
        }

        // Lifecycle
        if other.lifecycle.strict.is_some() {
            base.lifecycle.strict = other.lifecycle.strict;
        }
    }

    /// Apply environment variable overrides.
    /// Pattern: `DEPMAT_MATRIX_INITIAL_CAPACITY`, `DEPMAT_SINK_KIND`, etc.
    /// Unparseable values are ignored with a warning.
    fn apply_env_overrides(config: &mut DepmatConfig) {
        if let Some(v) = env_parse::<usize>("DEPMAT_MATRIX_INITIAL_CAPACITY") {
            config.matrix.initial_capacity = Some(v);
        }
        if let Some(v) = env_parse::<bool>("DEPMAT_MATRIX_SEED_SENTINELS") {
            config.matrix.seed_sentinels = Some(v);
        }
        if let Some(v) = env_parse::<u64>("DEPMAT_SCOPE_SWEEP_INTERVAL_MS") {
            config.scope.sweep_interval_ms = Some(v);
        }
        if let Some(v) = env_parse::<bool>("DEPMAT_SCOPE_BACKGROUND_SWEEP") {
            config.scope.background_sweep = Some(v);
        }
        if let Some(v) = env_parse::<SinkKind>("DEPMAT_SINK_KIND") {
            config.sink.kind = Some(v);
        }
        if let Ok(val) = std::env::var("DEPMAT_SINK_OUTPUT_DIR") {
            config.sink.output_dir = Some(PathBuf::from(val));
        }
        if let Some(v) = env_parse::<usize>("DEPMAT_SINK_QUEUE_CAPACITY") {
            config.sink.queue_capacity = Some(v);
        }
        if let Ok(val) = std::env::var("DEPMAT_SINK_SNAPSHOT_NAME") {
            config.sink.snapshot_name = Some(val);
        }
        if let Some(v) = env_parse::<bool>("DEPMAT_LIFECYCLE_STRICT") {
            config.lifecycle.strict = Some(v);
        }
    }

    /// Apply explicit overrides (highest priority).
    fn apply_overrides(config: &mut DepmatConfig, overrides: &ConfigOverrides) {
        if let Some(v) = overrides.sink_kind {
            config.sink.kind = Some(v);
        }
        if let Some(ref v) = overrides.output_dir {
            config.sink.output_dir = Some(v.clone());
        }
        if let Some(v) = overrides.queue_capacity {
            config.sink.queue_capacity = Some(v);
        }
        if let Some(v) = overrides.strict_lifecycle {
            config.lifecycle.strict = Some(v);
        }
    }

    /// Serialize the config back to TOML.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self).map_err(|e| ConfigError::ParseError {
            path: "<serialization>".to_string(),
            message: e.to_string(),
        })
    }
}

fn env_parse<T: std::str::FromStr>(key: &str) -> Option<T> {
    let val = std::env::var(key).ok()?;
    match val.parse::<T>() {
        Ok(v) => Some(v),
        Err(_) => {
            ::tracing::warn!(key, value = %val, "ignoring unparseable environment override");
            None
        }
    }
}
