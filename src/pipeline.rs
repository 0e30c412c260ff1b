//! Run pipeline
//!
//! One run walks a fixed state machine:
//! START → LOADED → LOCATED_ENDPOINT → {FOUND | NOT_FOUND} → MUTATED → SAVED → DONE
//!
//! Every check happens before SAVED, so a failing run never writes. A dry run,
//! or a merge that leaves the rendered bytes unchanged, goes from MUTATED
//! straight to DONE without touching the file.

use serde::{Deserialize, Serialize};
use std::path::Path;

use zcl_catalog::{builtin, registry, ClusterEntry};

use crate::config::EffectiveConfig;
use crate::document::{sha256_hex, ZapDocument};
use crate::error::{MergeError, MergeResult};
use crate::merge::{merge_into, MergeOptions};
use crate::summary::MergeReport;

/// Stage of a merge run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RunStage {
    Start,
    Loaded,
    LocatedEndpoint,
    Found,
    NotFound,
    Mutated,
    Saved,
    Done,
}

impl RunStage {
    /// Check if transition from this stage to target is valid
    pub fn can_transition_to(&self, target: RunStage) -> bool {
        matches!(
            (self, target),
            (RunStage::Start, RunStage::Loaded)
                | (RunStage::Loaded, RunStage::LocatedEndpoint)
                | (RunStage::LocatedEndpoint, RunStage::Found)
                | (RunStage::LocatedEndpoint, RunStage::NotFound)
                | (RunStage::Found, RunStage::Mutated)
                | (RunStage::NotFound, RunStage::Mutated)
                | (RunStage::Mutated, RunStage::Saved)
                // Dry run or nothing to write
                | (RunStage::Mutated, RunStage::Done)
                | (RunStage::Saved, RunStage::Done)
        )
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, RunStage::Done)
    }
}

/// Tracks the stage of a single run
#[derive(Debug, Clone)]
pub struct RunTracker {
    stage: RunStage,
    history: Vec<RunStage>,
}

impl Default for RunTracker {
    fn default() -> Self {
        Self::new()
    }
}

impl RunTracker {
    pub fn new() -> Self {
        Self {
            stage: RunStage::Start,
            history: vec![RunStage::Start],
        }
    }

    pub fn stage(&self) -> RunStage {
        self.stage
    }

    /// Stages visited so far, in order
    pub fn history(&self) -> &[RunStage] {
        &self.history
    }

    /// Transition to `next`
    pub fn advance(&mut self, next: RunStage) -> MergeResult<()> {
        if !self.stage.can_transition_to(next) {
            return Err(MergeError::Internal(format!(
                "invalid stage transition from {:?} to {:?}",
                self.stage, next
            )));
        }
        tracing::debug!(from = ?self.stage, to = ?next, "stage transition");
        self.stage = next;
        self.history.push(next);
        Ok(())
    }
}

/// Run the merge described by `config`
pub fn run(config: &EffectiveConfig) -> MergeResult<MergeReport> {
    let entry = builtin::catalog(&config.catalog)?;
    // Catalogs that collide with each other are unusable
    registry::global()?;
    run_entry(&config.zap_file, &entry, &config.merge_options(), config.dry_run)
}

/// Run the merge of `entry` into the document at `path`
pub fn run_entry(
    path: &Path,
    entry: &ClusterEntry,
    options: &MergeOptions,
    dry_run: bool,
) -> MergeResult<MergeReport> {
    let mut tracker = RunTracker::new();

    let mut doc = ZapDocument::load(path)?;
    let before_digest = doc.digest().to_string();
    tracker.advance(RunStage::Loaded)?;

    let mut endpoint = doc.target_endpoint()?;
    let endpoint_index = endpoint.index();
    let endpoint_name = endpoint.name().map(str::to_string);
    tracker.advance(RunStage::LocatedEndpoint)?;

    let outcome = merge_into(&mut endpoint, entry, options)?;
    tracker.advance(if outcome.action.found_existing() {
        RunStage::Found
    } else {
        RunStage::NotFound
    })?;
    tracker.advance(RunStage::Mutated)?;

    let rendered = doc.to_bytes().map_err(|e| MergeError::Io {
        path: path.to_path_buf(),
        source: e.into(),
    })?;
    let after_digest = sha256_hex(&rendered);

    let saved = if dry_run || after_digest == before_digest {
        false
    } else {
        doc.save(path)?;
        tracker.advance(RunStage::Saved)?;
        true
    };
    tracker.advance(RunStage::Done)?;

    Ok(MergeReport {
        path: path.to_path_buf(),
        endpoint_index,
        endpoint_name,
        outcome,
        attributes: entry.attributes().to_vec(),
        before_digest,
        after_digest,
        saved,
    })
}
