//! Merge errors
//!
//! Every failure aborts the run before anything is written, so each variant
//! maps to a distinct, stable exit code.

use std::io;
use std::path::PathBuf;

use zcl_catalog::SchemaError;

/// Errors raised while loading, merging or saving a ZAP document
#[derive(Debug, thiserror::Error)]
pub enum MergeError {
    #[error("file not found: {}", path.display())]
    NotFound { path: PathBuf },

    #[error("cannot parse {}: {reason}", path.display())]
    Parse { path: PathBuf, reason: String },

    #[error("{0}")]
    Schema(String),

    #[error("cannot write {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("{0}")]
    Internal(String),
}

impl MergeError {
    pub fn schema(detail: impl Into<String>) -> Self {
        MergeError::Schema(detail.into())
    }

    /// Short label naming the failure kind
    pub fn kind(&self) -> &'static str {
        match self {
            MergeError::NotFound { .. } => "not found",
            MergeError::Parse { .. } => "parse error",
            MergeError::Schema(_) => "schema error",
            MergeError::Io { .. } => "io error",
            MergeError::Internal(_) => "internal error",
        }
    }

    /// Get the exit code for this error
    pub fn exit_code(&self) -> i32 {
        match self {
            MergeError::NotFound { .. } => 2,
            MergeError::Parse { .. } => 3,
            MergeError::Schema(_) => 4,
            MergeError::Io { .. } => 5,
            MergeError::Internal(_) => 70,
        }
    }
}

impl From<SchemaError> for MergeError {
    fn from(err: SchemaError) -> Self {
        MergeError::Schema(err.to_string())
    }
}

/// Result type for merge operations
pub type MergeResult<T> = Result<T, MergeError>;
