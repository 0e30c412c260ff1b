//! ZAP cluster merge
//!
//! Merges validated ZCL cluster catalogs into the endpoint configuration of a
//! ZAP document, preserving everything the merge does not target.

pub mod config;
pub mod document;
pub mod error;
pub mod merge;
pub mod pipeline;
pub mod placement;
pub mod summary;

pub use config::{ConfigError, EffectiveConfig};
pub use document::{Endpoint, ZapDocument};
pub use error::{MergeError, MergeResult};
pub use merge::{merge, MergeAction, MergeMode, MergeOptions, MergeOutcome};
pub use pipeline::{run, RunStage};
pub use placement::{AnchorPolicy, AnchorRule, Placement};
pub use summary::MergeReport;
