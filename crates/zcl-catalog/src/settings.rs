//! Device settings exposed by a device integration.
//!
//! These describe how registered attributes surface as user-facing controls
//! (bounded numeric fields and on/off toggles). They are data only; the host
//! integration that renders them lives elsewhere. Validation checks that each
//! setting points at a registered attribute and that its bounds are
//! representable in that attribute's type.

use serde::Serialize;

use crate::error::SchemaError;
use crate::registry::AttributeRegistry;

/// How a device profile treats clusters that already exist on the device.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CatalogPolicy {
    /// Replace the existing cluster definition entirely.
    Replaces,
    /// Add the cluster alongside the existing ones.
    Adds,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum DeviceSetting {
    /// Numeric field; `min`, `max` and `step` are raw attribute units and the
    /// displayed value is `raw * multiplier`.
    Number {
        key: String,
        cluster: u16,
        attribute: u16,
        min: i64,
        max: i64,
        step: i64,
        unit: Option<String>,
        multiplier: f64,
    },
    /// On/off field backed by a boolean attribute.
    Toggle {
        key: String,
        cluster: u16,
        attribute: u16,
    },
}

impl DeviceSetting {
    pub fn key(&self) -> &str {
        match self {
            Self::Number { key, .. } | Self::Toggle { key, .. } => key,
        }
    }

    /// (cluster, attribute) this setting reads and writes.
    pub fn target(&self) -> (u16, u16) {
        match self {
            Self::Number {
                cluster, attribute, ..
            }
            | Self::Toggle {
                cluster, attribute, ..
            } => (*cluster, *attribute),
        }
    }

    pub fn validate(&self, registry: &AttributeRegistry) -> Result<(), SchemaError> {
        let (cluster, attribute) = self.target();
        let registered = registry
            .get(cluster, attribute)
            .ok_or(SchemaError::UnknownAttribute { cluster, attribute })?;
        let ty = registered.def.ty;

        let invalid = |reason: String| SchemaError::InvalidSetting {
            setting: self.key().to_string(),
            reason,
        };

        match self {
            Self::Number {
                min,
                max,
                step,
                multiplier,
                ..
            } => {
                if ty.is_boolean() {
                    return Err(invalid("numeric setting on a boolean attribute".to_string()));
                }
                if min > max {
                    return Err(invalid(format!("min {} exceeds max {}", min, max)));
                }
                if !ty.contains(*min) || !ty.contains(*max) {
                    return Err(invalid(format!(
                        "range {}..={} does not fit {}",
                        min, max, ty
                    )));
                }
                if *step <= 0 {
                    return Err(invalid(format!("step must be positive, got {}", step)));
                }
                if !multiplier.is_finite() || *multiplier <= 0.0 {
                    return Err(invalid(format!(
                        "multiplier must be positive, got {}",
                        multiplier
                    )));
                }
            }
            Self::Toggle { .. } => {
                if !ty.is_boolean() {
                    return Err(invalid(format!("toggle on non-boolean attribute of type {}", ty)));
                }
            }
        }

        Ok(())
    }
}

/// Settings and cluster policy of one device model.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DeviceProfile {
    pub manufacturer: String,
    pub model: String,
    pub policy: CatalogPolicy,
    pub clusters: Vec<u16>,
    pub settings: Vec<DeviceSetting>,
}

impl DeviceProfile {
    /// Validate every setting and reject duplicate keys.
    pub fn validate(&self, registry: &AttributeRegistry) -> Result<(), SchemaError> {
        let mut seen = std::collections::BTreeSet::new();
        for setting in &self.settings {
            if !seen.insert(setting.key()) {
                return Err(SchemaError::InvalidSetting {
                    setting: setting.key().to_string(),
                    reason: "duplicate setting key".to_string(),
                });
            }
            setting.validate(registry)?;
        }
        Ok(())
    }
}
