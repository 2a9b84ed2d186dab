//! Configuration system for depmat.
//! TOML-based, layered resolution: overrides > env > project > defaults.

pub mod depmat_config;
pub mod lifecycle_config;
pub mod matrix_config;
pub mod scope_config;
pub mod sink_config;

pub use depmat_config::{ConfigOverrides, DepmatConfig};
pub use lifecycle_config::LifecycleConfig;
pub use matrix_config::MatrixConfig;
pub use scope_config::ScopeConfig;
pub use sink_config::{SinkConfig, SinkKind};
