//! Catalog validation errors.

use crate::types::AttributeType;

/// Reasons a catalog, registry or device setting fails validation.
///
/// Every variant names the offending cluster and attribute so the
/// diagnostic can be acted on without re-reading the table.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SchemaError {
    #[error("duplicate attribute code {code:#06x} in cluster {cluster:#06x}")]
    DuplicateAttributeCode { cluster: u16, code: u16 },

    #[error("duplicate attribute name '{name}' in cluster {cluster:#06x}")]
    DuplicateAttributeName { cluster: u16, name: String },

    #[error("attribute '{attribute}' default {value} does not fit {ty}")]
    DefaultOutOfRange {
        attribute: String,
        value: i64,
        ty: AttributeType,
    },

    #[error("attribute '{attribute}' minInterval {min} exceeds maxInterval {max}")]
    IntervalOrder { attribute: String, min: u16, max: u16 },

    #[error(
        "attribute {attribute:#06x} of cluster {cluster:#06x} registered twice ('{existing}' and '{incoming}')"
    )]
    RegistryCollision {
        cluster: u16,
        attribute: u16,
        existing: String,
        incoming: String,
    },

    #[error("attribute {attribute:#06x} of cluster {cluster:#06x} is not registered")]
    UnknownAttribute { cluster: u16, attribute: u16 },

    #[error("setting '{setting}': {reason}")]
    InvalidSetting { setting: String, reason: String },

    #[error("unknown catalog '{0}'")]
    UnknownCatalog(String),
}
