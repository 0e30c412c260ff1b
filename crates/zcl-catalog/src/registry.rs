//! Attribute registry keyed by (cluster code, attribute code).
//!
//! Attribute identifiers are looked up here instead of being scattered as
//! module-level constants. Registering two attributes under the same key is
//! an error, so a table that silently shadows another is caught on load.

use std::collections::BTreeMap;
use std::sync::OnceLock;

use crate::attribute::AttributeDef;
use crate::builtin;
use crate::cluster::ClusterEntry;
use crate::error::SchemaError;

/// Registry key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct AttributeKey {
    pub cluster: u16,
    pub attribute: u16,
}

/// Registered attribute together with the cluster that declared it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegisteredAttribute {
    pub cluster_name: String,
    pub mfg_code: Option<u16>,
    pub def: AttributeDef,
}

#[derive(Debug, Clone, Default)]
pub struct AttributeRegistry {
    entries: BTreeMap<AttributeKey, RegisteredAttribute>,
}

impl AttributeRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register every attribute of `entry`.
    ///
    /// Nothing is registered if any attribute collides.
    pub fn register(&mut self, entry: &ClusterEntry) -> Result<(), SchemaError> {
        for attr in entry.attributes() {
            let key = AttributeKey {
                cluster: entry.code(),
                attribute: attr.code,
            };
            if let Some(existing) = self.entries.get(&key) {
                return Err(SchemaError::RegistryCollision {
                    cluster: key.cluster,
                    attribute: key.attribute,
                    existing: existing.def.name.clone(),
                    incoming: attr.name.clone(),
                });
            }
        }

        for attr in entry.attributes() {
            let key = AttributeKey {
                cluster: entry.code(),
                attribute: attr.code,
            };
            self.entries.insert(
                key,
                RegisteredAttribute {
                    cluster_name: entry.name().to_string(),
                    mfg_code: attr.mfg_code.or(entry.mfg_code()),
                    def: attr.clone(),
                },
            );
        }

        Ok(())
    }

    pub fn get(&self, cluster: u16, attribute: u16) -> Option<&RegisteredAttribute> {
        self.entries.get(&AttributeKey { cluster, attribute })
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate in (cluster, attribute) order.
    pub fn iter(&self) -> impl Iterator<Item = (&AttributeKey, &RegisteredAttribute)> {
        self.entries.iter()
    }

    /// Build a registry from a set of catalogs.
    pub fn from_catalogs<'a>(
        catalogs: impl IntoIterator<Item = &'a ClusterEntry>,
    ) -> Result<Self, SchemaError> {
        let mut registry = Self::new();
        for entry in catalogs {
            registry.register(entry)?;
        }
        Ok(registry)
    }
}

static GLOBAL: OnceLock<Result<AttributeRegistry, SchemaError>> = OnceLock::new();

/// Process-wide registry of every built-in catalog.
///
/// Built on first use; a collision between built-in tables is reported on
/// every call.
pub fn global() -> Result<&'static AttributeRegistry, SchemaError> {
    GLOBAL
        .get_or_init(|| {
            let catalogs = builtin::all()?;
            let registry = AttributeRegistry::from_catalogs(&catalogs)?;
            tracing::debug!(attributes = registry.len(), "attribute registry loaded");
            Ok(registry)
        })
        .as_ref()
        .map_err(Clone::clone)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cluster::ClusterHeader;
    use crate::types::AttributeType;

    fn entry(code: u16, attrs: &[(&str, u16)]) -> ClusterEntry {
        ClusterEntry::build(
            ClusterHeader::new(format!("cluster-{}", code), code, "TEST_CLUSTER"),
            attrs
                .iter()
                .map(|(name, c)| AttributeDef::new(*name, *c, AttributeType::Int8u, 0))
                .collect(),
        )
        .unwrap()
    }

    #[test]
    fn test_register_and_lookup() {
        let mut registry = AttributeRegistry::new();
        registry.register(&entry(1, &[("a", 0x20), ("b", 0x21)])).unwrap();

        assert_eq!(registry.len(), 2);
        assert_eq!(registry.get(1, 0x20).unwrap().def.name, "a");
        assert!(registry.get(2, 0x20).is_none());
    }

    #[test]
    fn test_same_attribute_code_in_other_cluster() {
        let mut registry = AttributeRegistry::new();
        registry.register(&entry(1, &[("a", 0x20)])).unwrap();
        registry.register(&entry(2, &[("a", 0x20)])).unwrap();
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn test_collision_detected() {
        let mut registry = AttributeRegistry::new();
        registry.register(&entry(1, &[("a", 0x20)])).unwrap();

        let err = registry
            .register(&entry(1, &[("fresh", 0x10), ("b", 0x20)]))
            .unwrap_err();
        assert_eq!(
            err,
            SchemaError::RegistryCollision {
                cluster: 1,
                attribute: 0x20,
                existing: "a".to_string(),
                incoming: "b".to_string(),
            }
        );
        // Rejected catalog leaves no partial registration behind
        assert!(registry.get(1, 0x10).is_none());
    }

    #[test]
    fn test_iteration_order() {
        let registry =
            AttributeRegistry::from_catalogs(&[entry(2, &[("z", 1)]), entry(1, &[("y", 5), ("x", 3)])])
                .unwrap();
        let keys: Vec<(u16, u16)> = registry.iter().map(|(k, _)| (k.cluster, k.attribute)).collect();
        assert_eq!(keys, vec![(1, 3), (1, 5), (2, 1)]);
    }

    #[test]
    fn test_global_contains_builtins() {
        let registry = global().unwrap();
        assert_eq!(registry.get(0x0001, 0x0020).unwrap().def.name, "BatteryVoltage");
        assert_eq!(
            registry.get(0x0000, 0xF000).unwrap().mfg_code,
            Some(builtin::OPENBME280_MFG_CODE)
        );
    }
}
