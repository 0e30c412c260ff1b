//! Validated ZCL attribute catalogs.
//!
//! A catalog describes the attributes of one cluster: identity, type, bounds,
//! default and reporting policy. Catalogs are hand-authored tables that are
//! validated once by [`ClusterEntry::build`] and then handed to the document
//! merger as immutable values.

mod attribute;
pub mod builtin;
mod cluster;
mod error;
pub mod registry;
pub mod settings;
mod types;

pub use attribute::AttributeDef;
pub use cluster::{ClusterEntry, ClusterHeader};
pub use error::SchemaError;
pub use registry::AttributeRegistry;
pub use settings::{CatalogPolicy, DeviceProfile, DeviceSetting};
pub use types::{AttributeType, Side, StorageOption};

/// Common ZCL cluster identifiers.
pub mod id {
    pub const BASIC: u16 = 0x0000;
    pub const POWER_CONFIGURATION: u16 = 0x0001;
    pub const DEVICE_TEMPERATURE: u16 = 0x0002;
    pub const IDENTIFY: u16 = 0x0003;
    pub const GROUPS: u16 = 0x0004;
    pub const SCENES: u16 = 0x0005;
    pub const ON_OFF: u16 = 0x0006;
    pub const TEMPERATURE_MEASUREMENT: u16 = 0x0402;
    pub const PRESSURE_MEASUREMENT: u16 = 0x0403;
    pub const RELATIVE_HUMIDITY: u16 = 0x0405;
}
