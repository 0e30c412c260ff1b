//! Cluster merge
//!
//! Applies a validated [`ClusterEntry`] to the target endpoint of a document:
//! - Matched code + `replace`: every field the entry defines overwrites the
//!   existing record in place; keys the entry does not define are kept.
//! - Matched code + `add`: the existing record is left alone.
//! - Matched code, extension entry: only the attribute list is touched.
//!   Attributes are matched by code and manufacturer code; `replace` updates
//!   matches in place, both modes append the missing ones.
//! - No match: the entry is inserted at the anchor-policy position.
//!
//! Re-applying the same entry is a no-op on the rendered document.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use std::str::FromStr;

use zcl_catalog::ClusterEntry;

use crate::document::{Endpoint, ZapDocument};
use crate::error::{MergeError, MergeResult};
use crate::placement::{AnchorPolicy, Placement};

/// What to do with a cluster that already exists
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MergeMode {
    /// Overwrite the matched cluster with the entry
    #[default]
    Replace,
    /// Only insert; leave a matched cluster untouched
    Add,
}

impl fmt::Display for MergeMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MergeMode::Replace => write!(f, "replace"),
            MergeMode::Add => write!(f, "add"),
        }
    }
}

impl FromStr for MergeMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "replace" => Ok(MergeMode::Replace),
            "add" => Ok(MergeMode::Add),
            other => Err(format!("unknown merge mode '{}' (expected replace or add)", other)),
        }
    }
}

/// Merge options
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MergeOptions {
    pub mode: MergeMode,
    pub placement: AnchorPolicy,
}

/// What the merge did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MergeAction {
    Inserted(Placement),
    Updated,
    /// Extension merged into an existing cluster's attribute list
    Extended { updated: usize, appended: usize },
    Skipped,
}

impl MergeAction {
    /// Whether the cluster was already in the endpoint
    pub fn found_existing(&self) -> bool {
        !matches!(self, MergeAction::Inserted(_))
    }
}

/// Outcome of a merge
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MergeOutcome {
    pub code: u16,
    pub name: String,
    pub action: MergeAction,
    /// Index of the cluster record in the endpoint after the merge
    pub position: usize,
}

/// Merge `entry` into the document's target endpoint
pub fn merge(
    doc: &mut ZapDocument,
    entry: &ClusterEntry,
    options: &MergeOptions,
) -> MergeResult<MergeOutcome> {
    let mut endpoint = doc.target_endpoint()?;
    merge_into(&mut endpoint, entry, options)
}

/// Merge `entry` into one endpoint
pub fn merge_into(
    endpoint: &mut Endpoint<'_>,
    entry: &ClusterEntry,
    options: &MergeOptions,
) -> MergeResult<MergeOutcome> {
    let record = render(entry)?;
    let found = endpoint.find_cluster(entry.code())?;

    let (action, position) = match (found, options.mode) {
        (Some(index), mode) if entry.extends() => {
            let existing = cluster_record(endpoint, index)?;
            let (updated, appended) = extend_attributes(existing, entry, mode)?;
            tracing::info!(
                cluster = entry.code(),
                position = index,
                updated,
                appended,
                "extended cluster attributes"
            );
            let action = if updated + appended == 0 {
                MergeAction::Skipped
            } else {
                MergeAction::Extended { updated, appended }
            };
            (action, index)
        }
        (Some(index), MergeMode::Replace) => {
            let existing = cluster_record(endpoint, index)?;
            overlay(existing, record);
            tracing::info!(cluster = entry.code(), position = index, "updated cluster");
            (MergeAction::Updated, index)
        }
        (Some(index), MergeMode::Add) => {
            tracing::info!(cluster = entry.code(), position = index, "cluster present, left as is");
            (MergeAction::Skipped, index)
        }
        (None, _) => {
            let codes = endpoint.cluster_codes()?;
            let placement = options.placement.insert_position(&codes, entry.code());
            if let Placement::Fallback { index } = placement {
                tracing::warn!(
                    cluster = entry.code(),
                    index,
                    "no anchor cluster present, using fallback position"
                );
            }
            let index = placement.index();
            endpoint.clusters_mut().insert(index, Value::Object(record));
            tracing::info!(cluster = entry.code(), position = index, "inserted cluster");
            (MergeAction::Inserted(placement), index)
        }
    };

    Ok(MergeOutcome {
        code: entry.code(),
        name: entry.name().to_string(),
        action,
        position,
    })
}

fn cluster_record<'e>(
    endpoint: &'e mut Endpoint<'_>,
    index: usize,
) -> MergeResult<&'e mut Map<String, Value>> {
    endpoint.clusters_mut()[index]
        .as_object_mut()
        .ok_or_else(|| MergeError::schema(format!("cluster #{} is not a record", index)))
}

/// Mapping update: existing keys keep their slot, new keys are appended
fn overlay(existing: &mut Map<String, Value>, record: Map<String, Value>) {
    for (key, value) in record {
        existing.insert(key, value);
    }
}

/// Merge the entry's attributes into an existing cluster record.
///
/// Returns how many attributes were updated in place and how many appended.
fn extend_attributes(
    existing: &mut Map<String, Value>,
    entry: &ClusterEntry,
    mode: MergeMode,
) -> MergeResult<(usize, usize)> {
    let code = entry.code();
    let attributes = existing
        .entry("attributes")
        .or_insert_with(|| Value::Array(Vec::new()))
        .as_array_mut()
        .ok_or_else(|| {
            MergeError::schema(format!("cluster {:#06x} attributes are not a list", code))
        })?;

    let (mut updated, mut appended) = (0, 0);
    for attr in entry.attributes() {
        let rendered = match serde_json::to_value(attr) {
            Ok(Value::Object(map)) => map,
            Ok(_) | Err(_) => {
                return Err(MergeError::schema(format!(
                    "attribute {:#06x} of cluster {:#06x} cannot be rendered",
                    attr.code, code
                )))
            }
        };
        let mfg_code = rendered.get("mfgCode").cloned().unwrap_or(Value::Null);

        let slot = attributes.iter_mut().find(|a| {
            a.get("code").and_then(Value::as_u64) == Some(u64::from(attr.code))
                && a.get("mfgCode").unwrap_or(&Value::Null) == &mfg_code
        });

        match (slot, mode) {
            (Some(Value::Object(current)), MergeMode::Replace) => {
                overlay(current, rendered);
                updated += 1;
            }
            (Some(_), _) => {}
            (None, _) => {
                attributes.push(Value::Object(rendered));
                appended += 1;
            }
        }
    }

    Ok((updated, appended))
}

fn render(entry: &ClusterEntry) -> MergeResult<Map<String, Value>> {
    match entry.to_zap_value() {
        Ok(Value::Object(map)) => Ok(map),
        Ok(_) => Err(MergeError::schema(format!(
            "cluster {:#06x} did not render as a record",
            entry.code()
        ))),
        Err(e) => Err(MergeError::schema(format!(
            "cluster {:#06x} cannot be rendered: {}",
            entry.code(),
            e
        ))),
    }
}
