//! Primitive attribute types and enumerations used in ZAP records.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Primitive ZCL attribute types supported by catalogs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AttributeType {
    #[serde(rename = "int8u")]
    Int8u,
    #[serde(rename = "int16u")]
    Int16u,
    #[serde(rename = "int8s")]
    Int8s,
    #[serde(rename = "int16s")]
    Int16s,
    #[serde(rename = "boolean")]
    Boolean,
    #[serde(rename = "enum8")]
    Enum8,
}

impl AttributeType {
    /// Name of the type as it appears in a ZAP document.
    pub fn zap_name(&self) -> &'static str {
        match self {
            Self::Int8u => "int8u",
            Self::Int16u => "int16u",
            Self::Int8s => "int8s",
            Self::Int16s => "int16s",
            Self::Boolean => "boolean",
            Self::Enum8 => "enum8",
        }
    }

    /// Inclusive range of native values representable by this type.
    pub fn bounds(&self) -> (i64, i64) {
        match self {
            Self::Int8u | Self::Enum8 => (0, u8::MAX as i64),
            Self::Int16u => (0, u16::MAX as i64),
            Self::Int8s => (i8::MIN as i64, i8::MAX as i64),
            Self::Int16s => (i16::MIN as i64, i16::MAX as i64),
            Self::Boolean => (0, 1),
        }
    }

    /// Check whether `value` fits the declared bit width and signedness.
    pub fn contains(&self, value: i64) -> bool {
        let (min, max) = self.bounds();
        (min..=max).contains(&value)
    }

    pub fn is_boolean(&self) -> bool {
        matches!(self, Self::Boolean)
    }
}

impl fmt::Display for AttributeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.zap_name())
    }
}

/// Which side of a cluster an attribute or cluster belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    #[default]
    Server,
    Client,
}

/// Where the generated firmware keeps the attribute value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum StorageOption {
    #[default]
    #[serde(rename = "RAM")]
    Ram,
    #[serde(rename = "NVM")]
    Nvm,
    #[serde(rename = "External")]
    External,
}
