//! Built-in defaults (layer 1)

use serde::{Deserialize, Serialize};

use zcl_catalog::builtin;

/// Conventional location of the ZAP file, relative to the project root
pub const DEFAULT_ZAP_FILE: &str = "config/zcl/zcl_config.zap";

/// Repo config picked up from the working directory when present
pub const DEFAULT_REPO_CONFIG: &str = "zap-merge.toml";

/// Built-in default configuration values
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BuiltinDefaults {
    /// ZAP document to update
    pub zap_file: String,

    /// Built-in catalog to merge (default: "power-configuration")
    pub catalog: String,

    /// Merge mode (default: "replace")
    pub mode: String,

    /// Stop before writing (default: false)
    pub dry_run: bool,

    /// Cluster new entries are placed after (default: 0x0000, Basic)
    pub anchor: u16,

    /// Insert position when no anchor is present (default: 1)
    pub fallback_index: usize,
}

impl Default for BuiltinDefaults {
    fn default() -> Self {
        Self {
            zap_file: DEFAULT_ZAP_FILE.to_string(),
            catalog: builtin::POWER_CONFIGURATION.to_string(),
            mode: "replace".to_string(),
            dry_run: false,
            anchor: 0x0000,
            fallback_index: 1,
        }
    }
}

impl BuiltinDefaults {
    /// Convert to JSON Value for merging
    pub fn to_value(&self) -> serde_json::Value {
        serde_json::json!({
            "zap_file": self.zap_file,
            "catalog": self.catalog,
            "mode": self.mode,
            "dry_run": self.dry_run,
            "placement": {
                "rules": [
                    { "after": self.anchor }
                ],
                "fallback_index": self.fallback_index
            }
        })
    }
}
