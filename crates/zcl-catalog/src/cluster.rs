//! Validated cluster entries.

use serde::Serialize;
use std::collections::BTreeSet;

use crate::attribute::{zap_flag, AttributeDef};
use crate::error::SchemaError;
use crate::types::Side;

/// Identity of a cluster, everything except its attribute list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClusterHeader {
    pub name: String,
    pub code: u16,
    pub mfg_code: Option<u16>,
    /// Generator macro name, e.g. `POWER_CONFIGURATION_CLUSTER`.
    pub define: String,
    pub side: Side,
    pub enabled: bool,
}

impl ClusterHeader {
    /// Enabled server-side cluster header.
    pub fn new(name: impl Into<String>, code: u16, define: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            code,
            mfg_code: None,
            define: define.into(),
            side: Side::Server,
            enabled: true,
        }
    }
}

/// A cluster and its attribute catalog, validated once at construction.
///
/// There is no way to mutate an entry after [`ClusterEntry::build`], so a
/// value in hand is always a valid catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClusterEntry {
    name: String,
    code: u16,
    mfg_code: Option<u16>,
    define: String,
    side: Side,
    #[serde(serialize_with = "zap_flag")]
    enabled: bool,
    attributes: Vec<AttributeDef>,
    #[serde(skip)]
    extends: bool,
}

impl ClusterEntry {
    /// Validate an attribute table and bind it to a cluster.
    ///
    /// Fails on the first attribute whose code or name repeats, whose default
    /// does not fit its type, or whose reporting intervals are inverted.
    pub fn build(header: ClusterHeader, attributes: Vec<AttributeDef>) -> Result<Self, SchemaError> {
        let mut codes = BTreeSet::new();
        let mut names = BTreeSet::new();

        for attr in &attributes {
            if !codes.insert(attr.code) {
                return Err(SchemaError::DuplicateAttributeCode {
                    cluster: header.code,
                    code: attr.code,
                });
            }
            if !names.insert(attr.name.as_str()) {
                return Err(SchemaError::DuplicateAttributeName {
                    cluster: header.code,
                    name: attr.name.clone(),
                });
            }
            attr.validate()?;
        }

        tracing::debug!(
            cluster = header.code,
            attributes = attributes.len(),
            "built cluster catalog"
        );

        Ok(Self {
            name: header.name,
            code: header.code,
            mfg_code: header.mfg_code,
            define: header.define,
            side: header.side,
            enabled: header.enabled,
            attributes,
            extends: false,
        })
    }

    /// Like [`ClusterEntry::build`], for a table of extra attributes that is
    /// merged into an existing cluster instead of replacing it.
    pub fn build_extension(
        header: ClusterHeader,
        attributes: Vec<AttributeDef>,
    ) -> Result<Self, SchemaError> {
        Ok(Self {
            extends: true,
            ..Self::build(header, attributes)?
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn code(&self) -> u16 {
        self.code
    }

    pub fn mfg_code(&self) -> Option<u16> {
        self.mfg_code
    }

    pub fn define(&self) -> &str {
        &self.define
    }

    pub fn side(&self) -> Side {
        self.side
    }

    pub fn enabled(&self) -> bool {
        self.enabled
    }

    /// Attributes in generation order.
    pub fn attributes(&self) -> &[AttributeDef] {
        &self.attributes
    }

    /// Whether the attributes extend an existing cluster record.
    pub fn extends(&self) -> bool {
        self.extends
    }

    pub fn attribute(&self, code: u16) -> Option<&AttributeDef> {
        self.attributes.iter().find(|a| a.code == code)
    }

    /// Render as a ZAP cluster record in canonical field order.
    pub fn to_zap_value(&self) -> Result<serde_json::Value, serde_json::Error> {
        serde_json::to_value(self)
    }
}
