use assert_cmd::prelude::*;
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

const NETWORK: &str = r#"{
    "ego": "E",
    "interactions": [
        {"sourceId": "A", "targetId": "E", "timestampLabel": "t1", "weight": 2},
        {"sourceId": "E", "targetId": "B", "timestampLabel": "t1", "weight": 1},
        {"sourceId": "B", "targetId": "C", "timestampLabel": "t1", "weight": 1},
        {"sourceId": "C", "targetId": "D", "timestampLabel": "t1", "weight": 1},
        {"sourceId": "A", "targetId": "E", "timestampLabel": "t2", "weight": 1}
    ]
}"#;

fn write_fixture(dir: &Path, name: &str, text: &str) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, text).expect("write fixture");
    path
}

fn run_json(args: &[&str]) -> Value {
    let exe = assert_cmd::cargo_bin!("egoline-cli");
    let out = Command::new(exe).args(args).assert().success();
    serde_json::from_slice(&out.get_output().stdout).expect("stdout is JSON")
}

#[test]
fn cli_lays_out_a_file() {
    let tmp = tempfile::tempdir().expect("tempdir");
    let input = write_fixture(tmp.path(), "net.json", NETWORK);

    let layout = run_json(&["layout", input.to_string_lossy().as_ref()]);
    assert_eq!(layout["timestamps"], serde_json::json!(["t1", "t2"]));
    assert_eq!(layout["actors"], serde_json::json!(["A", "E", "B", "C"]));
    assert!(layout["heights"].is_array());
    assert!(layout["metrics"]["span"].is_number());
}

#[test]
fn cli_extract_drops_the_third_hop() {
    let tmp = tempfile::tempdir().expect("tempdir");
    let input = write_fixture(tmp.path(), "net.json", NETWORK);

    let kept = run_json(&["extract", input.to_string_lossy().as_ref()]);
    let kept = kept.as_array().expect("array");
    assert_eq!(kept.len(), 4);
    assert!(kept.iter().all(|it| it["targetId"] != "D"));
}

#[test]
fn cli_stats_report_metrics() {
    let tmp = tempfile::tempdir().expect("tempdir");
    let input = write_fixture(tmp.path(), "net.json", NETWORK);

    let stats = run_json(&[
        "stats",
        "--minimize",
        "line",
        "--pretty",
        input.to_string_lossy().as_ref(),
    ]);
    assert_eq!(stats["ego"], "E");
    assert_eq!(stats["timestamps"], 2);
    assert_eq!(stats["actors"], 4);
    assert_eq!(stats["bends"], 0);
}

#[test]
fn cli_buckets_epoch_timestamps() {
    let tmp = tempfile::tempdir().expect("tempdir");
    let input = write_fixture(
        tmp.path(),
        "raw.json",
        r#"{
            "ego": "E",
            "interactions": [
                {"sourceId": "A", "targetId": "E", "timestamp": 90000, "weight": 1},
                {"sourceId": "A", "targetId": "E", "timestamp": 100, "weight": 1}
            ]
        }"#,
    );

    let layout = run_json(&[
        "--bucket-delta",
        "86400",
        input.to_string_lossy().as_ref(),
    ]);
    assert_eq!(
        layout["timestamps"],
        serde_json::json!(["1970-01-01", "1970-01-02"])
    );
}

#[test]
fn cli_rejects_wiggles() {
    let tmp = tempfile::tempdir().expect("tempdir");
    let input = write_fixture(tmp.path(), "net.json", NETWORK);

    let exe = assert_cmd::cargo_bin!("egoline-cli");
    let out = Command::new(exe)
        .args(["--minimize", "wiggles", input.to_string_lossy().as_ref()])
        .assert()
        .code(1);
    let stderr = String::from_utf8_lossy(&out.get_output().stderr).into_owned();
    assert!(stderr.contains("wiggles"), "stderr: {stderr}");
}

#[test]
fn cli_unknown_flag_prints_usage() {
    let exe = assert_cmd::cargo_bin!("egoline-cli");
    let out = Command::new(exe).arg("--frobnicate").assert().code(2);
    let stderr = String::from_utf8_lossy(&out.get_output().stderr).into_owned();
    assert!(stderr.contains("USAGE"));
}
