//! Shared helpers for integration tests.

#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};

use tempfile::TempDir;
use zap_cluster_merge::ZapDocument;

/// Sample configuration with Basic and Identify on one endpoint.
pub const SAMPLE_ZAP: &str = include_str!("zcl_config.zap");

/// Write `contents` to `zcl_config.zap` inside a fresh temp dir.
pub fn zap_file(contents: &str) -> (TempDir, PathBuf) {
    let dir = TempDir::new().expect("create temp dir");
    let path = dir.path().join("zcl_config.zap");
    fs::write(&path, contents).expect("write zap file");
    (dir, path)
}

/// Minimal document with the given cluster codes on one endpoint.
pub fn with_clusters(codes: &[u16]) -> String {
    let clusters: Vec<serde_json::Value> = codes
        .iter()
        .map(|code| serde_json::json!({"name": format!("cluster {}", code), "code": code}))
        .collect();
    let doc = serde_json::json!({"endpointTypes": [{"name": "ep", "clusters": clusters}]});
    serde_json::to_string_pretty(&doc).expect("render document")
}

/// Cluster codes of the first endpoint of the file at `path`.
pub fn cluster_codes(path: &Path) -> Vec<u16> {
    let mut doc = ZapDocument::load(path).expect("load document");
    let endpoint = doc.target_endpoint().expect("target endpoint");
    endpoint.cluster_codes().expect("cluster codes")
}
