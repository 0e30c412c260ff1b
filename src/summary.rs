//! Run report
//!
//! Produced by [`crate::pipeline::run`] and printed by the CLI.

use std::path::PathBuf;

use zcl_catalog::AttributeDef;

use crate::merge::{MergeAction, MergeOutcome};
use crate::placement::Placement;

/// What a run did to one document
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MergeReport {
    pub path: PathBuf,
    pub endpoint_index: usize,
    pub endpoint_name: Option<String>,
    pub outcome: MergeOutcome,
    /// Attributes of the merged catalog
    pub attributes: Vec<AttributeDef>,
    /// SHA-256 of the file before the run
    pub before_digest: String,
    /// SHA-256 of the rendered document after the merge
    pub after_digest: String,
    pub saved: bool,
}

impl MergeReport {
    /// Whether the merge changed the document bytes
    pub fn changed(&self) -> bool {
        self.before_digest != self.after_digest
    }

    /// Generate a human-readable summary
    pub fn to_human(&self) -> String {
        let mut out = String::new();
        let cluster = format!("{} ({:#06x})", self.outcome.name, self.outcome.code);
        let endpoint = match &self.endpoint_name {
            Some(name) => format!("endpoint {} '{}'", self.endpoint_index, name),
            None => format!("endpoint {}", self.endpoint_index),
        };

        let action = match self.outcome.action {
            MergeAction::Inserted(Placement::Anchored { anchor, index }) => format!(
                "Inserted {} into {} at position {} (after {:#06x})",
                cluster, endpoint, index, anchor
            ),
            MergeAction::Inserted(Placement::Fallback { index }) => format!(
                "Inserted {} into {} at fallback position {}",
                cluster, endpoint, index
            ),
            MergeAction::Updated => format!(
                "Updated {} in {} at position {}",
                cluster, endpoint, self.outcome.position
            ),
            MergeAction::Extended { updated, appended } => format!(
                "Extended {} in {} at position {}: {} attribute(s) updated, {} added",
                cluster, endpoint, self.outcome.position, updated, appended
            ),
            MergeAction::Skipped => format!(
                "Left existing {} in {} as is",
                cluster, endpoint
            ),
        };
        out.push_str(&action);
        out.push('\n');

        if self.outcome.action != MergeAction::Skipped {
            for attr in &self.attributes {
                out.push_str(&format!(
                    "  {:#06x} {:<32} {:<8} default {}",
                    attr.code, attr.name, attr.ty, attr.default_value
                ));
                if attr.reportable {
                    out.push_str(&format!(
                        ", reports every {}..{}s on change {}",
                        attr.min_interval, attr.max_interval, attr.reportable_change
                    ));
                }
                out.push('\n');
            }
        }

        let status = if !self.changed() {
            format!("{} unchanged", self.path.display())
        } else if self.saved {
            format!("Wrote {}", self.path.display())
        } else {
            format!("Dry run: {} not written", self.path.display())
        };
        out.push_str(&status);
        out
    }
}
