//! CLI integration tests driving the compiled binary.

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use tempfile::TempDir;

const CONFIG_YAML: &str = r#"
settings:
  name: widget

rules:
  issue-needs-triage:
    name: "Untriaged issues"
    resolution: "Add a triage/* label"
    type: issue
    filters:
      - label: "!triage/.*"
  pr-stale:
    name: "Stale pull requests"
    type: pull_request
    filters:
      - updated: "+14d"

collections:
  - id: daily
    name: "Daily triage"
    display: kanban
    dedup: true
    overflow: 2
    rules: [issue-needs-triage, pr-stale]
"#;

const SNAPSHOT_JSON: &str = r#"{
  "items": [
    {"id": "1", "kind": "issue", "title": "Crash on resize", "state": "open",
     "updated_at": "2024-05-19T00:00:00Z"},
    {"id": "2", "kind": "issue", "title": "Triaged already", "state": "open",
     "labels": ["triage/accepted"], "updated_at": "2024-05-19T00:00:00Z"},
    {"id": "3", "kind": "pull_request", "title": "Old refactor", "state": "open",
     "updated_at": "2024-04-01T00:00:00Z"}
  ]
}"#;

fn setup() -> (TempDir, String, String) {
    let dir = TempDir::new().unwrap();
    let config = dir.path().join("triage.yaml");
    let snapshot = dir.path().join("snapshot.json");
    fs::write(&config, CONFIG_YAML).unwrap();
    fs::write(&snapshot, SNAPSHOT_JSON).unwrap();
    (
        dir,
        config.to_string_lossy().to_string(),
        snapshot.to_string_lossy().to_string(),
    )
}

fn triage() -> Command {
    Command::cargo_bin("triage").unwrap()
}

#[test]
fn test_check_accepts_valid_config() {
    let (_dir, config, _) = setup();
    triage()
        .args(["check", "--config", &config])
        .assert()
        .success()
        .stdout(predicate::str::contains("2 rule(s), 1 collection(s)"));
}

#[test]
fn test_check_json_envelope() {
    let (_dir, config, _) = setup();
    let output = triage()
        .args(["check", "--config", &config, "--json"])
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();

    let json: serde_json::Value = serde_json::from_slice(&output).unwrap();
    assert_eq!(json["success"], true);
    assert_eq!(json["data"]["valid"], true);
    assert_eq!(json["data"]["rules"], 2);
}

#[test]
fn test_check_reports_all_errors_and_exits_4() {
    let dir = TempDir::new().unwrap();
    let config = dir.path().join("broken.yaml");
    fs::write(
        &config,
        r#"
rules:
  bad:
    name: "Bad"
    filters:
      - label: "(["
      - updated: "someday"
collections:
  - id: c
    name: "C"
    rules: [bad, ghost]
"#,
    )
    .unwrap();

    triage()
        .args(["check", "--config", &config.to_string_lossy()])
        .assert()
        .code(4)
        .stderr(predicate::str::contains("3 configuration error(s):"))
        .stderr(predicate::str::contains("invalid regex"))
        .stderr(predicate::str::contains("invalid duration"))
        .stderr(predicate::str::contains("unknown rule 'ghost'"));
}

#[test]
fn test_check_missing_config_exits_3() {
    triage()
        .args(["check", "--config", "/nonexistent/triage.yaml"])
        .assert()
        .code(3)
        .stderr(predicate::str::contains("failed to read config file"));
}

#[test]
fn test_classify_json_output() {
    let (_dir, config, snapshot) = setup();
    let output = triage()
        .args([
            "classify",
            "--config",
            &config,
            "--snapshot",
            &snapshot,
            "--at",
            "2024-05-20T00:00:00Z",
            "--json",
        ])
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();

    let json: serde_json::Value = serde_json::from_slice(&output).unwrap();
    let collections = json["data"]["collections"].as_array().unwrap();
    assert_eq!(collections.len(), 1);

    let rules = collections[0]["rules"].as_array().unwrap();
    // Item 1 is untriaged; item 2 carries a triage/* label; item 3 is stale
    assert_eq!(rules[0]["total"], 1);
    assert_eq!(rules[0]["visible"][0]["id"], "1");
    assert_eq!(rules[1]["total"], 1);
    assert_eq!(rules[1]["visible"][0]["id"], "3");
}

#[test]
fn test_classify_single_collection_human_output() {
    let (_dir, config, snapshot) = setup();
    triage()
        .args([
            "classify",
            "--config",
            &config,
            "--snapshot",
            &snapshot,
            "--at",
            "2024-05-20T00:00:00Z",
            "--collection",
            "daily",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("Daily triage"))
        .stdout(predicate::str::contains("1 | Crash on resize"));
}

#[test]
fn test_classify_unknown_collection_exits_3() {
    let (_dir, config, snapshot) = setup();
    triage()
        .args([
            "classify",
            "--config",
            &config,
            "--snapshot",
            &snapshot,
            "--collection",
            "weekly",
        ])
        .assert()
        .code(3)
        .stderr(predicate::str::contains("no collection with id 'weekly'"));
}

#[test]
fn test_classify_rejects_bad_timestamp() {
    let (_dir, config, snapshot) = setup();
    triage()
        .args([
            "classify",
            "--config",
            &config,
            "--snapshot",
            &snapshot,
            "--at",
            "yesterday",
        ])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("invalid --at timestamp"));
}

#[test]
fn test_rules_lists_compiled_rules() {
    let (_dir, config, _) = setup();
    triage()
        .args(["rules", "--config", &config])
        .assert()
        .success()
        .stdout(predicate::str::contains("issue-needs-triage"))
        .stdout(predicate::str::contains("pr-stale"));
}

#[test]
fn test_schema_config_prints_json_schema() {
    let output = triage()
        .args(["schema", "config"])
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();

    let json: serde_json::Value = serde_json::from_slice(&output).unwrap();
    assert!(json["properties"]["rules"].is_object());
    assert!(json["properties"]["collections"].is_object());
}

#[test]
fn test_schema_unknown_target_exits_2() {
    triage()
        .args(["schema", "board"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("invalid schema target"));
}
