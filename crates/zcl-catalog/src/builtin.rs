//! Built-in hand-authored catalogs.

use crate::attribute::{AttributeDef, NO_REPORT_MAX_INTERVAL};
use crate::cluster::{ClusterEntry, ClusterHeader};
use crate::error::SchemaError;
use crate::id;
use crate::settings::{CatalogPolicy, DeviceProfile, DeviceSetting};
use crate::types::{AttributeType, StorageOption};

pub const POWER_CONFIGURATION: &str = "power-configuration";
pub const OPENBME280_BASIC: &str = "openbme280-basic";

/// Manufacturer code of the OpenBME280 firmware.
pub const OPENBME280_MFG_CODE: u16 = 0x1002;

/// Names of every built-in catalog, in registration order.
pub fn catalog_names() -> &'static [&'static str] {
    &[POWER_CONFIGURATION, OPENBME280_BASIC]
}

/// Resolve a built-in catalog by name.
pub fn catalog(name: &str) -> Result<ClusterEntry, SchemaError> {
    match name {
        POWER_CONFIGURATION => power_configuration(),
        OPENBME280_BASIC => openbme280_basic(),
        other => Err(SchemaError::UnknownCatalog(other.to_string())),
    }
}

/// All built-in catalogs.
pub fn all() -> Result<Vec<ClusterEntry>, SchemaError> {
    catalog_names().iter().map(|name| catalog(name)).collect()
}

/// Power Configuration (0x0001) for a 2xAAA battery pack.
///
/// Voltages are in 100 mV units, percentage in half-percent steps
/// (200 = 100%).
pub fn power_configuration() -> Result<ClusterEntry, SchemaError> {
    const HOUR: u16 = 3600;

    ClusterEntry::build(
        ClusterHeader::new(
            "Power Configuration",
            id::POWER_CONFIGURATION,
            "POWER_CONFIGURATION_CLUSTER",
        ),
        vec![
            AttributeDef::new("BatteryVoltage", 0x0020, AttributeType::Int8u, 30)
                .reportable(HOUR, 2 * HOUR, 1),
            AttributeDef::new("BatteryPercentageRemaining", 0x0021, AttributeType::Int8u, 200)
                .reportable(HOUR, 2 * HOUR, 10),
            // 0x03 = AAA
            AttributeDef::new("BatterySize", 0x0031, AttributeType::Enum8, 3),
            AttributeDef::new("BatteryQuantity", 0x0033, AttributeType::Int8u, 2),
            AttributeDef::new("BatteryRatedVoltage", 0x0035, AttributeType::Int8u, 30),
            AttributeDef::new("cluster revision", 0xFFFD, AttributeType::Int16u, 1)
                .reportable(0, NO_REPORT_MAX_INTERVAL, 0),
        ],
    )
}

/// Manufacturer-specific configuration attributes the OpenBME280 firmware
/// adds to the Basic cluster. Offsets and thresholds are in 0.01 units.
///
/// The table extends Basic: the standard attributes already in a document are
/// kept and these are merged in next to them.
pub fn openbme280_basic() -> Result<ClusterEntry, SchemaError> {
    let mfg = |attr: AttributeDef| attr.manufacturer(OPENBME280_MFG_CODE).storage(StorageOption::Nvm);

    ClusterEntry::build_extension(
        ClusterHeader::new("Basic", id::BASIC, "BASIC_CLUSTER"),
        vec![
            mfg(AttributeDef::new("sensor_read_interval", 0xF000, AttributeType::Int16u, 60)),
            mfg(AttributeDef::new("temperature_offset", 0xF001, AttributeType::Int16s, 0)),
            mfg(AttributeDef::new("humidity_offset", 0xF002, AttributeType::Int16s, 0)),
            mfg(AttributeDef::new("pressure_offset", 0xF003, AttributeType::Int16s, 0)),
            mfg(AttributeDef::new("led_enable", 0xF004, AttributeType::Boolean, 1)),
            mfg(AttributeDef::new("report_threshold_temperature", 0xF010, AttributeType::Int16u, 100)),
            mfg(AttributeDef::new("report_threshold_humidity", 0xF011, AttributeType::Int16u, 100)),
            mfg(AttributeDef::new("report_threshold_pressure", 0xF012, AttributeType::Int16u, 1)),
        ],
    )
}

/// User-facing settings the OpenBME280 device integration exposes.
pub fn openbme280_profile() -> DeviceProfile {
    let centi = |key: &str, attribute: u16, min: i64, max: i64, unit: &str| DeviceSetting::Number {
        key: key.to_string(),
        cluster: id::BASIC,
        attribute,
        min,
        max,
        step: 1,
        unit: Some(unit.to_string()),
        multiplier: 0.01,
    };

    DeviceProfile {
        manufacturer: "OpenBME280".to_string(),
        model: "TRADFRI-BME280".to_string(),
        policy: CatalogPolicy::Adds,
        clusters: vec![
            id::BASIC,
            id::POWER_CONFIGURATION,
            id::IDENTIFY,
            id::TEMPERATURE_MEASUREMENT,
            id::PRESSURE_MEASUREMENT,
            id::RELATIVE_HUMIDITY,
        ],
        settings: vec![
            DeviceSetting::Number {
                key: "sensor_read_interval".to_string(),
                cluster: id::BASIC,
                attribute: 0xF000,
                min: 10,
                max: 3600,
                step: 1,
                unit: Some("s".to_string()),
                multiplier: 1.0,
            },
            centi("temperature_offset", 0xF001, -500, 500, "C"),
            centi("humidity_offset", 0xF002, -1000, 1000, "%"),
            centi("pressure_offset", 0xF003, -500, 500, "kPa"),
            DeviceSetting::Toggle {
                key: "led_enable".to_string(),
                cluster: id::BASIC,
                attribute: 0xF004,
            },
            centi("report_threshold_temperature", 0xF010, 0, 1000, "C"),
            centi("report_threshold_humidity", 0xF011, 0, 10000, "%"),
            centi("report_threshold_pressure", 0xF012, 0, 1000, "kPa"),
        ],
    }
}

/// Earlier integration for the same board, which claims Basic outright and
/// only exposes the read interval.
pub fn efr32mg1p_bme280_profile() -> DeviceProfile {
    DeviceProfile {
        manufacturer: "Custom".to_string(),
        model: "EFR32MG1P_BME280".to_string(),
        policy: CatalogPolicy::Replaces,
        clusters: vec![id::BASIC],
        settings: vec![DeviceSetting::Number {
            key: "sensor_read_interval".to_string(),
            cluster: id::BASIC,
            attribute: 0xF000,
            min: 10,
            max: 3600,
            step: 1,
            unit: Some("s".to_string()),
            multiplier: 1.0,
        }],
    }
}

/// Every built-in device profile.
pub fn profiles() -> Vec<DeviceProfile> {
    vec![openbme280_profile(), efr32mg1p_bme280_profile()]
}
