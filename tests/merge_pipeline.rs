//! End-to-end merge tests against on-disk ZAP documents.

mod fixtures;

use std::fs;
use std::io;

use pretty_assertions::assert_eq;
use serde_json::{json, Value};

use fixtures::{cluster_codes, with_clusters, zap_file, SAMPLE_ZAP};
use zap_cluster_merge::{
    merge, pipeline, EffectiveConfig, MergeAction, MergeError, MergeOptions, Placement, ZapDocument,
};
use zcl_catalog::{AttributeDef, AttributeType, ClusterEntry, ClusterHeader};

fn config_for(path: &std::path::Path, extra: Value) -> EffectiveConfig {
    let mut overrides = json!({"zap_file": path});
    if let (Some(base), Value::Object(extra)) = (overrides.as_object_mut(), extra) {
        base.extend(extra);
    }
    EffectiveConfig::build(None, Some(overrides)).unwrap()
}

fn battery_entry() -> ClusterEntry {
    ClusterEntry::build(
        ClusterHeader::new("Power Configuration", 1, "POWER_CONFIGURATION_CLUSTER"),
        vec![
            AttributeDef::new("BatteryVoltage", 32, AttributeType::Int8u, 30),
            AttributeDef::new("BatteryPercentageRemaining", 33, AttributeType::Int8u, 200),
        ],
    )
    .unwrap()
}

fn read_json(path: &std::path::Path) -> Value {
    serde_json::from_slice(&fs::read(path).unwrap()).unwrap()
}

#[test]
fn test_end_to_end_battery_scenario() {
    let (_dir, path) = zap_file(&with_clusters(&[0, 3]));

    let mut doc = ZapDocument::load(&path).unwrap();
    let outcome = merge(&mut doc, &battery_entry(), &MergeOptions::default()).unwrap();
    doc.save(&path).unwrap();

    assert_eq!(
        outcome.action,
        MergeAction::Inserted(Placement::Anchored { anchor: 0, index: 1 })
    );
    assert_eq!(cluster_codes(&path), vec![0, 1, 3]);

    let cluster = &read_json(&path)["endpointTypes"][0]["clusters"][1];
    let names: Vec<&str> = cluster["attributes"]
        .as_array()
        .unwrap()
        .iter()
        .map(|a| a["name"].as_str().unwrap())
        .collect();
    assert_eq!(names, vec!["BatteryVoltage", "BatteryPercentageRemaining"]);
    assert_eq!(cluster["attributes"][1]["defaultValue"], "200");

    // Second application leaves the file alone
    let first = fs::read(&path).unwrap();
    let mut doc = ZapDocument::load(&path).unwrap();
    merge(&mut doc, &battery_entry(), &MergeOptions::default()).unwrap();
    doc.save(&path).unwrap();
    assert_eq!(fs::read(&path).unwrap(), first);
}

#[test]
fn test_insertion_position_after_basic() {
    let (_dir, path) = zap_file(&with_clusters(&[0, 3, 6]));
    let report = pipeline::run(&config_for(&path, json!({}))).unwrap();

    assert_eq!(report.outcome.position, 1);
    assert_eq!(cluster_codes(&path), vec![0, 1, 3, 6]);
}

#[test]
fn test_configured_anchor_rule() {
    let (_dir, path) = zap_file(&with_clusters(&[0, 3, 6]));
    let config = config_for(
        &path,
        json!({"placement": {"rules": [{"cluster": 1, "after": 3}], "fallback_index": 1}}),
    );
    pipeline::run(&config).unwrap();

    assert_eq!(cluster_codes(&path), vec![0, 3, 1, 6]);
}

#[test]
fn test_fallback_when_anchor_missing() {
    let (_dir, path) = zap_file(&with_clusters(&[3, 6]));
    let report = pipeline::run(&config_for(&path, json!({}))).unwrap();

    assert_eq!(
        report.outcome.action,
        MergeAction::Inserted(Placement::Fallback { index: 1 })
    );
    assert_eq!(cluster_codes(&path), vec![3, 1, 6]);
}

#[test]
fn test_update_preserves_siblings() {
    let original = json!({"endpointTypes": [{"clusters": [
        {"name": "Basic", "code": 0, "attributes": [{"name": "ZCL version", "code": 0}]},
        {"name": "Power Configuration", "code": 1, "attributes": [{"name": "MainsVoltage", "code": 0}]},
        {"name": "Identify", "code": 3, "attributes": [{"name": "identify time", "code": 0}]}
    ]}]});
    let (_dir, path) = zap_file(&serde_json::to_string_pretty(&original).unwrap());

    let report = pipeline::run(&config_for(&path, json!({}))).unwrap();
    assert_eq!(report.outcome.action, MergeAction::Updated);
    assert_eq!(report.outcome.position, 1);

    let after = read_json(&path);
    let clusters = after["endpointTypes"][0]["clusters"].as_array().unwrap();
    assert_eq!(clusters.len(), 3);
    assert_eq!(clusters[0], original["endpointTypes"][0]["clusters"][0]);
    assert_eq!(clusters[2], original["endpointTypes"][0]["clusters"][2]);

    let codes: Vec<u64> = clusters[1]["attributes"]
        .as_array()
        .unwrap()
        .iter()
        .map(|a| a["code"].as_u64().unwrap())
        .collect();
    assert_eq!(codes, vec![0x20, 0x21, 0x31, 0x33, 0x35, 0xFFFD]);
}

#[test]
fn test_codes_stay_unique() {
    let (_dir, path) = zap_file(&with_clusters(&[0, 1, 3]));
    pipeline::run(&config_for(&path, json!({}))).unwrap();
    pipeline::run(&config_for(&path, json!({}))).unwrap();

    let mut codes = cluster_codes(&path);
    let len = codes.len();
    codes.sort_unstable();
    codes.dedup();
    assert_eq!(codes.len(), len);
}

#[test]
fn test_run_twice_is_byte_identical() {
    let (_dir, path) = zap_file(SAMPLE_ZAP);

    let first = pipeline::run(&config_for(&path, json!({}))).unwrap();
    assert!(first.changed());
    assert!(first.saved);
    let after_first = fs::read(&path).unwrap();

    let second = pipeline::run(&config_for(&path, json!({}))).unwrap();
    assert!(!second.changed());
    assert!(!second.saved);
    assert_eq!(fs::read(&path).unwrap(), after_first);
}

#[test]
fn test_unrelated_content_preserved() {
    let (_dir, path) = zap_file(SAMPLE_ZAP);
    let before = read_json(&path);

    pipeline::run(&config_for(&path, json!({}))).unwrap();
    let after = read_json(&path);

    for key in ["featureLevel", "creator", "keyValuePairs", "package", "endpoints"] {
        assert_eq!(after[key], before[key], "{} changed", key);
    }
    let endpoint = &after["endpointTypes"][0];
    assert_eq!(endpoint["deviceTypeRef"], before["endpointTypes"][0]["deviceTypeRef"]);
    assert_eq!(
        endpoint["clusters"][0]["attributes"][1]["defaultValue"],
        "Möbius Sensors"
    );

    // Top-level key order survives
    let keys: Vec<&str> = after.as_object().unwrap().keys().map(String::as_str).collect();
    assert_eq!(
        keys,
        vec!["featureLevel", "creator", "keyValuePairs", "package", "endpointTypes", "endpoints"]
    );

    // Layout survives: two-space indent, trailing newline, raw UTF-8
    let text = fs::read_to_string(&path).unwrap();
    assert!(text.starts_with("{\n  \"featureLevel\": 96,\n"));
    assert!(text.ends_with("}\n"));
    assert!(text.contains("Möbius Sensors"));
}

#[test]
fn test_dry_run_does_not_write() {
    let (_dir, path) = zap_file(SAMPLE_ZAP);

    let report = pipeline::run(&config_for(&path, json!({"dry_run": true}))).unwrap();

    assert!(report.changed());
    assert!(!report.saved);
    assert_eq!(fs::read_to_string(&path).unwrap(), SAMPLE_ZAP);
}

#[test]
fn test_add_mode_skips_existing_cluster() {
    let original = with_clusters(&[0, 1, 3]);
    let (_dir, path) = zap_file(&original);

    let report = pipeline::run(&config_for(&path, json!({"mode": "add"}))).unwrap();

    assert_eq!(report.outcome.action, MergeAction::Skipped);
    assert!(!report.changed());
    assert_eq!(fs::read_to_string(&path).unwrap(), original);
}

#[test]
fn test_manufacturer_catalog_extends_basic() {
    let (_dir, path) = zap_file(SAMPLE_ZAP);
    let before = read_json(&path)["endpointTypes"][0]["clusters"][0].clone();

    let config = config_for(&path, json!({"catalog": "openbme280-basic"}));
    let report = pipeline::run(&config).unwrap();
    assert_eq!(
        report.outcome.action,
        MergeAction::Extended { updated: 0, appended: 8 }
    );

    let basic = read_json(&path)["endpointTypes"][0]["clusters"][0].clone();
    assert!(basic["mfgCode"].is_null());
    assert_eq!(basic["define"], before["define"]);

    let attributes = basic["attributes"].as_array().unwrap();
    assert_eq!(attributes.len(), 10);
    assert_eq!(&attributes[..2], &before["attributes"].as_array().unwrap()[..]);
    assert_eq!(attributes[0]["name"], "ZCL version");
    assert_eq!(attributes[2]["name"], "sensor_read_interval");
    assert_eq!(attributes[2]["mfgCode"], 0x1002);
    assert_eq!(attributes[2]["storageOption"], "NVM");

    // Second run finds everything in place
    let again = pipeline::run(&config).unwrap();
    assert!(!again.changed());
    assert!(!again.saved);
}

#[test]
fn test_manufacturer_catalog_add_mode_appends_once() {
    let (_dir, path) = zap_file(SAMPLE_ZAP);
    let config = config_for(&path, json!({"catalog": "openbme280-basic", "mode": "add"}));

    let first = pipeline::run(&config).unwrap();
    assert_eq!(
        first.outcome.action,
        MergeAction::Extended { updated: 0, appended: 8 }
    );

    let second = pipeline::run(&config).unwrap();
    assert_eq!(second.outcome.action, MergeAction::Skipped);
    assert_eq!(cluster_codes(&path), vec![0, 3]);
}

#[test]
fn test_crlf_document_untouched_by_noop_merge() {
    let crlf = SAMPLE_ZAP.replace('\n', "\r\n");
    let (_dir, path) = zap_file(&crlf);

    let config = config_for(&path, json!({"catalog": "openbme280-basic", "mode": "add"}));
    pipeline::run(&config).unwrap();
    let extended = fs::read(&path).unwrap();
    assert!(!String::from_utf8_lossy(&extended).replace("\r\n", "").contains('\n'));

    let report = pipeline::run(&config).unwrap();
    assert_eq!(report.outcome.action, MergeAction::Skipped);
    assert!(!report.changed());
    assert!(!report.saved);
    assert_eq!(fs::read(&path).unwrap(), extended);
}

#[test]
fn test_crlf_preserved_on_insert() {
    let crlf = SAMPLE_ZAP.replace('\n', "\r\n");
    let (_dir, path) = zap_file(&crlf);

    let report = pipeline::run(&config_for(&path, json!({}))).unwrap();
    assert!(report.saved);

    let text = fs::read_to_string(&path).unwrap();
    assert!(text.starts_with("{\r\n  \"featureLevel\": 96,\r\n"));
    assert!(text.ends_with("}\r\n"));
    assert!(!text.replace("\r\n", "").contains('\n'));
    assert_eq!(cluster_codes(&path), vec![0, 1, 3]);
}

#[test]
fn test_failed_write_leaves_file_untouched() {
    let (dir, path) = zap_file(SAMPLE_ZAP);

    let mut doc = ZapDocument::load(&path).unwrap();
    merge(&mut doc, &battery_entry(), &MergeOptions::default()).unwrap();

    let err = doc
        .save_with(&path, |out, bytes| {
            out.write_all(&bytes[..bytes.len() / 2])?;
            Err(io::Error::new(io::ErrorKind::Other, "disk full"))
        })
        .unwrap_err();

    assert!(matches!(err, MergeError::Io { .. }));
    assert_eq!(err.exit_code(), 5);
    assert_eq!(fs::read_to_string(&path).unwrap(), SAMPLE_ZAP);

    let entries: Vec<_> = fs::read_dir(dir.path()).unwrap().collect();
    assert_eq!(entries.len(), 1, "temp file left behind");
}

#[test]
fn test_missing_file() {
    let dir = tempfile::TempDir::new().unwrap();
    let path = dir.path().join("absent.zap");

    let err = pipeline::run(&config_for(&path, json!({}))).unwrap_err();
    assert!(matches!(err, MergeError::NotFound { .. }));
    assert_eq!(err.kind(), "not found");
    assert_eq!(err.exit_code(), 2);
}

#[test]
fn test_malformed_json() {
    let (_dir, path) = zap_file("{\n  \"endpointTypes\": [\n");

    let err = pipeline::run(&config_for(&path, json!({}))).unwrap_err();
    assert!(matches!(err, MergeError::Parse { .. }));
    assert_eq!(err.exit_code(), 3);
}

#[test]
fn test_no_endpoints() {
    let original = "{\n  \"endpointTypes\": []\n}\n";
    let (_dir, path) = zap_file(original);

    let err = pipeline::run(&config_for(&path, json!({}))).unwrap_err();
    assert_eq!(err.kind(), "schema error");
    assert_eq!(err.exit_code(), 4);
    assert!(err.to_string().starts_with("no endpoints"));
    assert_eq!(fs::read_to_string(&path).unwrap(), original);
}
