//! Configuration loading and compile-error reporting tests.

use std::io::Write;
use tempfile::NamedTempFile;
use triage::{load_config, load_snapshot, CompiledSet, ConfigError, TriageConfig};

fn write_file(suffix: &str, contents: &str) -> NamedTempFile {
    let mut file = tempfile::Builder::new().suffix(suffix).tempfile().unwrap();
    file.write_all(contents.as_bytes()).unwrap();
    file
}

#[test]
fn test_yaml_config_loads_and_compiles() {
    let file = write_file(
        ".yaml",
        r#"
settings:
  name: widget
  repos: ["example/widget"]

rules:
  pr-needs-review:
    name: "Needs review"
    type: pull_request
    filters:
      - tag: "!(approved|changes-requested)"
      - state: "open"

collections:
  - id: review
    name: "Review queue"
    display: kanban
    overflow: 10
    rules: [pr-needs-review]
"#,
    );

    let config = load_config(file.path()).unwrap();
    let set = CompiledSet::compile(&config).unwrap();
    assert_eq!(set.rules().len(), 1);
    assert_eq!(set.collections()[0].overflow, Some(10));
}

#[test]
fn test_toml_config_loads_by_extension() {
    let file = write_file(
        ".toml",
        r#"
[rules.stale-prs]
name = "Stale pull requests"
type = "pull_request"
filters = [{ updated = "+14d" }]

[[collections]]
id = "cleanup"
name = "Cleanup"
dedup = true
rules = ["stale-prs"]
"#,
    );

    let config = load_config(file.path()).unwrap();
    let set = CompiledSet::compile(&config).unwrap();
    assert!(set.rule("stale-prs").is_some());
    assert!(set.collections()[0].dedup);
}

#[test]
fn test_malformed_yaml_is_a_load_error() {
    let file = write_file(".yaml", "rules: [not: a: mapping\n");
    let err = load_config(file.path()).unwrap_err();
    assert!(err.to_string().contains("failed to parse YAML config"));
}

#[test]
fn test_every_config_error_is_reported_with_location() {
    let file = write_file(
        ".yaml",
        r#"
rules:
  bad-regex:
    name: "Bad regex"
    filters:
      - title: "(["
  bad-kind:
    name: "Bad kind"
    type: epic
  bad-filters:
    name: "Bad filters"
    filters:
      - updated: "14d"
      - state: "reopened"
      - milestone: "v1"
collections:
  - id: board
    name: "Board"
    rules: [bad-regex, ghost-rule]
"#,
    );

    let config = load_config(file.path()).unwrap();
    let errors = CompiledSet::compile(&config).unwrap_err();
    let messages: Vec<String> = errors.errors().iter().map(|e| e.to_string()).collect();

    assert_eq!(errors.len(), 6, "got: {:#?}", messages);
    assert!(messages
        .iter()
        .any(|m| m.contains("rule 'bad-regex', filter #0") && m.contains("invalid regex")));
    assert!(messages.iter().any(|m| m.contains("rule 'bad-kind': invalid type 'epic'")));
    assert!(messages
        .iter()
        .any(|m| m.contains("rule 'bad-filters', filter #0") && m.contains("invalid duration")));
    assert!(messages
        .iter()
        .any(|m| m.contains("rule 'bad-filters', filter #1") && m.contains("invalid state")));
    assert!(messages
        .iter()
        .any(|m| m.contains("rule 'bad-filters', filter #2") && m.contains("unknown field 'milestone'")));
    assert!(messages
        .iter()
        .any(|m| m.contains("collection 'board': unknown rule 'ghost-rule'")));
}

#[test]
fn test_duplicate_rule_names_are_fatal() {
    let file = write_file(
        ".yaml",
        r#"
rules:
  stale:
    name: "First definition"
  stale:
    name: "Second definition"
"#,
    );

    let config = load_config(file.path()).unwrap();
    let errors = CompiledSet::compile(&config).unwrap_err();
    assert!(errors.errors().contains(&ConfigError::DuplicateRule {
        rule: "stale".to_string(),
    }));
}

#[test]
fn test_compilation_never_partially_succeeds() {
    let yaml = r#"
rules:
  fine:
    name: "Fine"
    filters:
      - state: "open"
  broken:
    name: "Broken"
    filters:
      - label: "(["
collections:
  - id: ok
    name: "OK"
    rules: [fine]
"#;
    let config: TriageConfig = serde_yaml::from_str(yaml).unwrap();
    // The well-formed rule and collection do not rescue the configuration
    assert!(CompiledSet::compile(&config).is_err());
}

#[test]
fn test_snapshot_loads_into_stable_order() {
    let file = write_file(
        ".json",
        r#"{
  "items": [
    {"id": "z9", "kind": "issue", "title": "Last", "state": "open",
     "updated_at": "2024-05-01T00:00:00Z"},
    {"id": "a1", "kind": "pull_request", "title": "First", "state": "closed",
     "updated_at": "2024-05-02T00:00:00Z",
     "labels": ["bug"], "tags": {"stale": true}}
  ]
}"#,
    );

    let snapshot = load_snapshot(file.path()).unwrap();
    assert_eq!(snapshot.len(), 2);
    assert_eq!(snapshot.items()[0].id, "a1");
    assert_eq!(snapshot.items()[1].id, "z9");
    assert!(snapshot.items()[0].tag("stale"));
}

#[test]
fn test_snapshot_with_bad_timestamp_fails_to_parse() {
    let file = write_file(
        ".json",
        r#"{"items": [{"id": "1", "kind": "issue", "title": "x", "state": "open",
            "updated_at": "yesterday"}]}"#,
    );
    let err = load_snapshot(file.path()).unwrap_err();
    assert!(err.to_string().contains("failed to parse snapshot"));
}
