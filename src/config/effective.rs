//! Effective configuration with provenance
//!
//! The effective config is the merged result of all layers plus a record of
//! which sources contributed to it.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};

use zcl_catalog::builtin;

use super::defaults::{BuiltinDefaults, DEFAULT_REPO_CONFIG};
use super::merge::merge_layers;
use crate::document::sha256_hex;
use crate::merge::{MergeMode, MergeOptions};
use crate::placement::AnchorPolicy;

/// Origin of a configuration source
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum ConfigOrigin {
    Builtin,
    Repo,
    Cli,
}

/// A contributing config source with provenance
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ConfigSource {
    pub origin: ConfigOrigin,

    /// File path (None for builtin/cli)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,

    /// SHA-256 digest of raw file bytes (None for builtin/cli)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub digest: Option<String>,
}

impl ConfigSource {
    fn unfiled(origin: ConfigOrigin) -> Self {
        Self {
            origin,
            path: None,
            digest: None,
        }
    }
}

/// Effective configuration for one run
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EffectiveConfig {
    /// ZAP document to update
    pub zap_file: PathBuf,

    /// Name of the built-in catalog to merge
    pub catalog: String,

    pub mode: MergeMode,

    /// Stop before writing
    pub dry_run: bool,

    pub placement: AnchorPolicy,

    /// Contributing sources in precedence order
    #[serde(skip)]
    pub sources: Vec<ConfigSource>,
}

impl EffectiveConfig {
    /// Build effective config from layers
    pub fn build(
        repo_config_path: Option<&Path>,
        cli_overrides: Option<Value>,
    ) -> Result<Self, ConfigError> {
        let mut layers = vec![BuiltinDefaults::default().to_value()];
        let mut sources = vec![ConfigSource::unfiled(ConfigOrigin::Builtin)];

        if let Some(path) = repo_config_path.filter(|p| p.exists()) {
            let (layer, digest) = Self::load_toml_file(path)?;
            layers.push(layer);
            sources.push(ConfigSource {
                origin: ConfigOrigin::Repo,
                path: Some(path.display().to_string()),
                digest: Some(digest),
            });
        }

        if let Some(cli) = cli_overrides {
            layers.push(cli);
            sources.push(ConfigSource::unfiled(ConfigOrigin::Cli));
        }

        let mut config: EffectiveConfig = serde_json::from_value(merge_layers(layers))
            .map_err(|e| ConfigError::ValidationError(e.to_string()))?;
        config.validate()?;
        config.sources = sources;

        tracing::debug!(
            zap_file = %config.zap_file.display(),
            catalog = %config.catalog,
            mode = %config.mode,
            sources = config.sources.len(),
            "resolved configuration"
        );

        Ok(config)
    }

    /// Pick the repo config file.
    ///
    /// An explicit path must exist; otherwise `zap-merge.toml` in `dir` is
    /// used when present.
    pub fn locate_repo_config(
        explicit: Option<PathBuf>,
        dir: &Path,
    ) -> Result<Option<PathBuf>, ConfigError> {
        match explicit {
            Some(path) if path.exists() => Ok(Some(path)),
            Some(path) => Err(ConfigError::IoError(format!(
                "config file not found: {}",
                path.display()
            ))),
            None => {
                let path = dir.join(DEFAULT_REPO_CONFIG);
                Ok(path.exists().then_some(path))
            }
        }
    }

    /// Merge options for this run
    pub fn merge_options(&self) -> MergeOptions {
        MergeOptions {
            mode: self.mode,
            placement: self.placement.clone(),
        }
    }

    /// Read a repo config file as a JSON layer plus the digest of its bytes
    fn load_toml_file(path: &Path) -> Result<(Value, String), ConfigError> {
        let bytes = fs::read(path)
            .map_err(|e| ConfigError::IoError(format!("{}: {}", path.display(), e)))?;
        let text = std::str::from_utf8(&bytes)
            .map_err(|e| ConfigError::ParseError(format!("{}: invalid UTF-8: {}", path.display(), e)))?;

        // TOML tables land directly in the JSON tree the layers are merged on
        let layer: Value = toml::from_str(text)
            .map_err(|e| ConfigError::ParseError(format!("{}: {}", path.display(), e)))?;

        Ok((layer, sha256_hex(&bytes)))
    }

    /// Validate configuration values
    fn validate(&self) -> Result<(), ConfigError> {
        if self.zap_file.as_os_str().is_empty() {
            return Err(ConfigError::ValidationError(
                "zap_file must not be empty".to_string(),
            ));
        }

        if !builtin::catalog_names().contains(&self.catalog.as_str()) {
            return Err(ConfigError::ValidationError(format!(
                "unknown catalog '{}' (available: {})",
                self.catalog,
                builtin::catalog_names().join(", ")
            )));
        }

        Ok(())
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    IoError(String),

    #[error("Parse error: {0}")]
    ParseError(String),

    #[error("Validation error: {0}")]
    ValidationError(String),
}

impl ConfigError {
    /// Get the exit code for this error
    pub fn exit_code(&self) -> i32 {
        1
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::placement::AnchorRule;
    use std::io::Write;
    use tempfile::{NamedTempFile, TempDir};

    #[test]
    fn test_build_with_defaults_only() {
        let config = EffectiveConfig::build(None, None).unwrap();

        assert_eq!(config.zap_file, PathBuf::from("config/zcl/zcl_config.zap"));
        assert_eq!(config.catalog, "power-configuration");
        assert_eq!(config.mode, MergeMode::Replace);
        assert!(!config.dry_run);
        assert_eq!(config.placement, AnchorPolicy::default());
    }

    #[test]
    fn test_build_with_cli_override() {
        let cli = serde_json::json!({"mode": "add", "dry_run": true});
        let config = EffectiveConfig::build(None, Some(cli)).unwrap();

        assert_eq!(config.mode, MergeMode::Add);
        assert!(config.dry_run);
    }

    #[test]
    fn test_unknown_catalog_rejected() {
        let cli = serde_json::json!({"catalog": "thermostat"});
        let err = EffectiveConfig::build(None, Some(cli)).unwrap_err();
        assert!(err.to_string().contains("unknown catalog 'thermostat'"));
    }

    #[test]
    fn test_unknown_mode_rejected() {
        let cli = serde_json::json!({"mode": "patch"});
        assert!(EffectiveConfig::build(None, Some(cli)).is_err());
    }

    #[test]
    fn test_unknown_key_rejected() {
        let cli = serde_json::json!({"zap_fiel": "typo.zap"});
        let err = EffectiveConfig::build(None, Some(cli)).unwrap_err();
        assert!(err.to_string().contains("zap_fiel"));
    }

    #[test]
    fn test_load_toml_file() {
        let mut temp = NamedTempFile::new().unwrap();
        writeln!(temp, "zap_file = \"fw/zcl.zap\"").unwrap();
        writeln!(temp, "[placement]").unwrap();
        writeln!(temp, "fallback_index = 0").unwrap();
        writeln!(temp, "[[placement.rules]]").unwrap();
        writeln!(temp, "cluster = 1029").unwrap();
        writeln!(temp, "after = 1026").unwrap();

        let config = EffectiveConfig::build(Some(temp.path()), None).unwrap();

        assert_eq!(config.zap_file, PathBuf::from("fw/zcl.zap"));
        assert_eq!(config.placement.fallback_index, 0);
        assert_eq!(
            config.placement.rules,
            vec![AnchorRule {
                cluster: Some(0x0405),
                after: 0x0402
            }]
        );
        assert_eq!(config.sources.len(), 2);
        assert_eq!(config.sources[1].origin, ConfigOrigin::Repo);
        assert!(config.sources[1].digest.is_some());
    }

    #[test]
    fn test_cli_beats_repo() {
        let mut temp = NamedTempFile::new().unwrap();
        writeln!(temp, "mode = \"add\"").unwrap();

        let cli = serde_json::json!({"mode": "replace"});
        let config = EffectiveConfig::build(Some(temp.path()), Some(cli)).unwrap();
        assert_eq!(config.mode, MergeMode::Replace);
    }

    #[test]
    fn test_bad_toml() {
        let mut temp = NamedTempFile::new().unwrap();
        writeln!(temp, "mode = ").unwrap();
        let err = EffectiveConfig::build(Some(temp.path()), None).unwrap_err();
        assert!(matches!(err, ConfigError::ParseError(_)));
    }

    #[test]
    fn test_locate_repo_config() {
        let dir = TempDir::new().unwrap();
        assert_eq!(EffectiveConfig::locate_repo_config(None, dir.path()).unwrap(), None);

        let default_path = dir.path().join(DEFAULT_REPO_CONFIG);
        fs::write(&default_path, "").unwrap();
        assert_eq!(
            EffectiveConfig::locate_repo_config(None, dir.path()).unwrap(),
            Some(default_path)
        );

        let missing = dir.path().join("missing.toml");
        assert!(EffectiveConfig::locate_repo_config(Some(missing), dir.path()).is_err());
    }

    #[test]
    fn test_sources_tracked() {
        let config = EffectiveConfig::build(None, None).unwrap();

        assert_eq!(config.sources.len(), 1);
        assert_eq!(config.sources[0].origin, ConfigOrigin::Builtin);
    }
}
