//! Anchor-based placement of new clusters
//!
//! A new cluster goes immediately after an anchor cluster. Rules are tried
//! in declared order; the first whose anchor is present in the endpoint wins.
//! Without any present anchor the cluster lands at `fallback_index`, which
//! by default keeps an identity-like cluster (Basic) first.

use serde::{Deserialize, Serialize};

/// "Insert after cluster `after`", optionally limited to one target cluster
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnchorRule {
    /// Target cluster this rule applies to (None = any cluster)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cluster: Option<u16>,

    /// Code of the anchor cluster
    pub after: u16,
}

impl AnchorRule {
    pub fn after(anchor: u16) -> Self {
        Self {
            cluster: None,
            after: anchor,
        }
    }

    fn applies_to(&self, target: u16) -> bool {
        self.cluster.map_or(true, |c| c == target)
    }
}

/// Ordered anchor rules plus the fallback position
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnchorPolicy {
    #[serde(default)]
    pub rules: Vec<AnchorRule>,

    #[serde(default = "default_fallback_index")]
    pub fallback_index: usize,
}

fn default_fallback_index() -> usize {
    1
}

impl Default for AnchorPolicy {
    /// Insert after Basic (0x0000), else at index 1
    fn default() -> Self {
        Self {
            rules: vec![AnchorRule::after(0x0000)],
            fallback_index: default_fallback_index(),
        }
    }
}

/// Where an insert position came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Placement {
    /// After the anchor cluster with this code
    Anchored { anchor: u16, index: usize },
    /// No anchor present
    Fallback { index: usize },
}

impl Placement {
    pub fn index(&self) -> usize {
        match self {
            Placement::Anchored { index, .. } | Placement::Fallback { index } => *index,
        }
    }
}

impl AnchorPolicy {
    /// Compute the insert position for `target` among clusters with `codes`.
    ///
    /// `codes` are in document order. The result is always `<= codes.len()`.
    pub fn insert_position(&self, codes: &[u16], target: u16) -> Placement {
        for rule in self.rules.iter().filter(|r| r.applies_to(target)) {
            if let Some(i) = codes.iter().position(|&c| c == rule.after) {
                return Placement::Anchored {
                    anchor: rule.after,
                    index: i + 1,
                };
            }
        }

        Placement::Fallback {
            index: self.fallback_index.min(codes.len()),
        }
    }
}
