//! ZAP configuration documents
//!
//! A document is kept as a JSON tree with key order preserved, so records the
//! merge does not target are written back exactly as they were read. The
//! indentation, line-ending and trailing-newline conventions of the source
//! file are detected on load and reused on save to avoid spurious diffs.

mod endpoint;
mod persist;

pub use endpoint::Endpoint;
pub use persist::write_atomic;

use serde::Serialize;
use serde_json::ser::PrettyFormatter;
use serde_json::Value;
use sha2::{Digest, Sha256};
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use crate::error::{MergeError, MergeResult};

/// Top-level key holding the endpoint list
pub const ENDPOINT_TYPES: &str = "endpointTypes";

/// Key holding an endpoint's cluster list
pub const CLUSTERS: &str = "clusters";

/// Whitespace conventions of the file a document was read from
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Layout {
    /// Indent unit; None for single-line documents
    pub indent: Option<String>,
    /// Lines end in `\r\n`
    pub crlf: bool,
    pub trailing_newline: bool,
}

impl Default for Layout {
    fn default() -> Self {
        Self {
            indent: Some("  ".to_string()),
            crlf: false,
            trailing_newline: false,
        }
    }
}

impl Layout {
    /// Detect the layout of a JSON text.
    ///
    /// The indent unit is the leading whitespace of the first indented line.
    pub fn detect(text: &str) -> Self {
        let trailing_newline = text.ends_with('\n');
        let crlf = text.contains("\r\n");

        if !text.trim_end().contains('\n') {
            return Self {
                indent: None,
                crlf,
                trailing_newline,
            };
        }

        let indent = text
            .lines()
            .skip(1)
            .map(|line| {
                let width = line.len() - line.trim_start_matches(|c: char| c == ' ' || c == '\t').len();
                &line[..width]
            })
            .find(|ws| !ws.is_empty())
            .unwrap_or("  ");

        Self {
            indent: Some(indent.to_string()),
            crlf,
            trailing_newline,
        }
    }
}

/// A loaded ZAP document
#[derive(Debug, Clone)]
pub struct ZapDocument {
    path: PathBuf,
    root: Value,
    layout: Layout,
    digest: String,
}

impl ZapDocument {
    /// Read and parse the document at `path`
    pub fn load(path: &Path) -> MergeResult<Self> {
        let bytes = match fs::read(path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                return Err(MergeError::NotFound {
                    path: path.to_path_buf(),
                })
            }
            Err(e) => {
                return Err(MergeError::Io {
                    path: path.to_path_buf(),
                    source: e,
                })
            }
        };

        let doc = Self::from_bytes(path, &bytes)?;
        tracing::debug!(path = %path.display(), digest = %doc.digest, "loaded document");
        Ok(doc)
    }

    /// Parse document bytes; `path` is only used for diagnostics and saving
    pub fn from_bytes(path: &Path, bytes: &[u8]) -> MergeResult<Self> {
        let parse_error = |reason: String| MergeError::Parse {
            path: path.to_path_buf(),
            reason,
        };

        let text = std::str::from_utf8(bytes).map_err(|e| parse_error(format!("invalid UTF-8: {}", e)))?;
        let root: Value = serde_json::from_str(text).map_err(|e| parse_error(e.to_string()))?;

        if !root.is_object() {
            return Err(parse_error("top level is not an object".to_string()));
        }

        match root.get(ENDPOINT_TYPES) {
            None => {
                return Err(MergeError::schema(format!(
                    "no endpoints: '{}' is missing",
                    ENDPOINT_TYPES
                )))
            }
            Some(Value::Array(_)) => {}
            Some(_) => {
                return Err(MergeError::schema(format!(
                    "no endpoints: '{}' is not a list",
                    ENDPOINT_TYPES
                )))
            }
        }

        Ok(Self {
            path: path.to_path_buf(),
            root,
            layout: Layout::detect(text),
            digest: sha256_hex(bytes),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn root(&self) -> &Value {
        &self.root
    }

    pub fn layout(&self) -> &Layout {
        &self.layout
    }

    /// SHA-256 of the bytes the document was loaded from
    pub fn digest(&self) -> &str {
        &self.digest
    }

    pub fn endpoint_count(&self) -> usize {
        self.root
            .get(ENDPOINT_TYPES)
            .and_then(Value::as_array)
            .map_or(0, Vec::len)
    }

    /// The endpoint the tool operates on: the first one in the document.
    pub fn target_endpoint(&mut self) -> MergeResult<Endpoint<'_>> {
        let endpoints = self
            .root
            .get_mut(ENDPOINT_TYPES)
            .and_then(Value::as_array_mut)
            .ok_or_else(|| MergeError::schema("no endpoints"))?;

        let endpoint = endpoints
            .first_mut()
            .ok_or_else(|| MergeError::schema(format!("no endpoints: '{}' is empty", ENDPOINT_TYPES)))?;

        Endpoint::bind(0, endpoint)
    }

    /// Render with the document's own layout
    pub fn to_bytes(&self) -> Result<Vec<u8>, serde_json::Error> {
        let mut out = Vec::new();
        match &self.layout.indent {
            Some(indent) => {
                let formatter = PrettyFormatter::with_indent(indent.as_bytes());
                let mut ser = serde_json::Serializer::with_formatter(&mut out, formatter);
                self.root.serialize(&mut ser)?;
            }
            None => serde_json::to_writer(&mut out, &self.root)?,
        }
        if self.layout.trailing_newline {
            out.push(b'\n');
        }
        // JSON strings escape their newlines, so every raw one is a line break
        if !self.layout.crlf {
            return Ok(out);
        }
        let lines: Vec<&[u8]> = out.split(|&b| b == b'\n').collect();
        Ok(lines.join(&b"\r\n"[..]))
    }

    /// Atomically replace the file at `path` with this document
    pub fn save(&self, path: &Path) -> MergeResult<()> {
        self.save_with(path, |out, bytes| out.write_all(bytes))
    }

    /// Like [`ZapDocument::save`], with a caller-supplied write step.
    ///
    /// If `write` fails the target file is left untouched.
    pub fn save_with<W>(&self, path: &Path, write: W) -> MergeResult<()>
    where
        W: FnOnce(&mut dyn Write, &[u8]) -> io::Result<()>,
    {
        let io_error = |source: io::Error| MergeError::Io {
            path: path.to_path_buf(),
            source,
        };

        let bytes = self.to_bytes().map_err(|e| io_error(e.into()))?;
        write_atomic(path, |file| write(file, &bytes)).map_err(io_error)?;

        tracing::info!(path = %path.display(), bytes = bytes.len(), "saved document");
        Ok(())
    }
}

/// Hex SHA-256 of `bytes`
pub fn sha256_hex(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    hex::encode(hasher.finalize())
}
