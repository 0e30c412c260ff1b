//! Tool configuration
//!
//! Three layers, later layers win:
//! 1. Built-in defaults
//! 2. Repo config (`zap-merge.toml` or `--config`)
//! 3. CLI flags

mod defaults;
mod effective;
mod merge;

pub use defaults::{BuiltinDefaults, DEFAULT_REPO_CONFIG, DEFAULT_ZAP_FILE};
pub use effective::{ConfigError, ConfigOrigin, ConfigSource, EffectiveConfig};
pub use merge::{deep_merge, merge_layers};
