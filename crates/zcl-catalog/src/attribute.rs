//! Attribute definitions.

use serde::{Serialize, Serializer};

use crate::error::SchemaError;
use crate::types::{AttributeType, Side, StorageOption};

/// Max interval ZAP writes for attributes that never report on a timer.
pub const NO_REPORT_MAX_INTERVAL: u16 = 65344;

/// A single typed, addressable attribute of a cluster.
///
/// Field order matches the attribute record of a ZAP document, so the
/// serialized form can be spliced into a document without reordering.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AttributeDef {
    pub name: String,
    pub code: u16,
    pub mfg_code: Option<u16>,
    pub side: Side,
    #[serde(rename = "type")]
    pub ty: AttributeType,
    #[serde(serialize_with = "zap_flag")]
    pub included: bool,
    pub storage_option: StorageOption,
    #[serde(serialize_with = "zap_flag")]
    pub singleton: bool,
    #[serde(serialize_with = "zap_flag")]
    pub bounded: bool,
    /// Native value; written to the document as a decimal string.
    #[serde(serialize_with = "zap_default")]
    pub default_value: i64,
    #[serde(serialize_with = "zap_flag")]
    pub reportable: bool,
    /// Seconds.
    pub min_interval: u16,
    /// Seconds.
    pub max_interval: u16,
    /// Minimum delta in the attribute's native unit that triggers a report.
    pub reportable_change: u32,
}

impl AttributeDef {
    /// Create a server-side, RAM-backed, non-reporting attribute.
    pub fn new(name: impl Into<String>, code: u16, ty: AttributeType, default_value: i64) -> Self {
        Self {
            name: name.into(),
            code,
            mfg_code: None,
            side: Side::Server,
            ty,
            included: true,
            storage_option: StorageOption::Ram,
            singleton: false,
            bounded: false,
            default_value,
            reportable: false,
            min_interval: 0,
            max_interval: NO_REPORT_MAX_INTERVAL,
            reportable_change: 0,
        }
    }

    /// Enable reporting with the given policy.
    pub fn reportable(mut self, min_interval: u16, max_interval: u16, change: u32) -> Self {
        self.reportable = true;
        self.min_interval = min_interval;
        self.max_interval = max_interval;
        self.reportable_change = change;
        self
    }

    pub fn storage(mut self, storage_option: StorageOption) -> Self {
        self.storage_option = storage_option;
        self
    }

    /// Mark as manufacturer-specific.
    pub fn manufacturer(mut self, mfg_code: u16) -> Self {
        self.mfg_code = Some(mfg_code);
        self
    }

    /// Check the rules that concern this attribute alone.
    ///
    /// Uniqueness of codes and names is checked by the owning cluster.
    pub fn validate(&self) -> Result<(), SchemaError> {
        if !self.ty.contains(self.default_value) {
            return Err(SchemaError::DefaultOutOfRange {
                attribute: self.name.clone(),
                value: self.default_value,
                ty: self.ty,
            });
        }

        // Zero means "unset" for either bound.
        if self.reportable
            && self.min_interval != 0
            && self.max_interval != 0
            && self.min_interval > self.max_interval
        {
            return Err(SchemaError::IntervalOrder {
                attribute: self.name.clone(),
                min: self.min_interval,
                max: self.max_interval,
            });
        }

        Ok(())
    }
}

/// ZAP stores flags as 0/1 integers.
pub(crate) fn zap_flag<S: Serializer>(flag: &bool, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_u8(u8::from(*flag))
}

fn zap_default<S: Serializer>(value: &i64, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&value.to_string())
}
