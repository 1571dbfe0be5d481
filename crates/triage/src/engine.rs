//! Classification engine: configuration compilation and evaluation passes.
//!
//! Compilation is all-or-nothing: every rule and collection is checked and
//! every defect reported together. A compiled set is immutable and safely
//! shared across concurrent passes; reload builds a new set and swaps the
//! reference (e.g. behind an `Arc`), never mutating one in place.
//!
//! Rule matching is embarrassingly parallel over the shared immutable
//! snapshot, so match lists are computed with a parallel iterator and joined
//! before the inherently sequential per-collection dedup fold runs.

use crate::collection::{CollectionResult, CompiledCollection};
use crate::config::{CollectionSpec, RuleSpec, TriageConfig};
use crate::domain::Snapshot;
use crate::errors::{ConfigError, ConfigErrors};
use crate::rules::CompiledRule;
use chrono::{DateTime, Utc};
use rayon::prelude::*;
use schemars::JsonSchema;
use serde::Serialize;
use std::collections::{HashMap, HashSet};

/// An immutable, compiled rule and collection set
#[derive(Debug, Clone)]
pub struct CompiledSet {
    rules: Vec<CompiledRule>,
    collections: Vec<CompiledCollection>,
}

/// Result of one full classification pass
///
/// Collection results preserve configuration order; `collection` looks one
/// up by id. Results borrow items from the snapshot and never outlive the
/// pass.
#[derive(Debug, Clone, PartialEq, Serialize, JsonSchema)]
pub struct Classification<'a> {
    /// Per-collection results in configuration order
    pub collections: Vec<CollectionResult<'a>>,
}

impl<'a> Classification<'a> {
    /// Look up one collection's result by id.
    pub fn collection(&self, id: &str) -> Option<&CollectionResult<'a>> {
        self.collections.iter().find(|c| c.id == id)
    }
}

impl CompiledSet {
    /// Compile raw configuration into an immutable set, all-or-nothing.
    ///
    /// On failure the returned `ConfigErrors` holds every detected defect,
    /// each naming its owning rule or collection.
    pub fn compile(config: &TriageConfig) -> Result<CompiledSet, ConfigErrors> {
        Self::compile_parts(config.rules.entries(), &config.collections)
    }

    /// Compile from rule entries and collection specs directly.
    ///
    /// Rule entries may contain duplicate names (e.g. as preserved from a
    /// YAML mapping); duplicates are reported, not collapsed.
    pub fn compile_parts(
        rule_entries: &[(String, RuleSpec)],
        collection_specs: &[CollectionSpec],
    ) -> Result<CompiledSet, ConfigErrors> {
        let mut errors = ConfigErrors::new();

        let mut rules: Vec<CompiledRule> = Vec::with_capacity(rule_entries.len());
        let mut rule_index: HashMap<&str, usize> = HashMap::new();
        let mut known_names: HashSet<&str> = HashSet::new();

        for (id, spec) in rule_entries {
            if !known_names.insert(id.as_str()) {
                errors.push(ConfigError::DuplicateRule { rule: id.clone() });
                continue;
            }
            if let Some(rule) = CompiledRule::compile(id, spec, &mut errors) {
                rule_index.insert(id.as_str(), rules.len());
                rules.push(rule);
            }
        }

        let mut collections: Vec<CompiledCollection> = Vec::with_capacity(collection_specs.len());
        let mut collection_ids: HashSet<&str> = HashSet::new();

        for spec in collection_specs {
            if !collection_ids.insert(spec.id.as_str()) {
                errors.push(ConfigError::DuplicateCollection {
                    collection: spec.id.clone(),
                });
                continue;
            }
            if spec.overflow == Some(0) {
                errors.push(ConfigError::InvalidOverflow {
                    collection: spec.id.clone(),
                });
            }

            let mut rule_indices = Vec::with_capacity(spec.rules.len());
            for rule_name in &spec.rules {
                if !known_names.contains(rule_name.as_str()) {
                    errors.push(ConfigError::UnknownRule {
                        collection: spec.id.clone(),
                        rule: rule_name.clone(),
                    });
                    continue;
                }
                // A known name can still lack an index when its rule failed
                // to compile; the pass is failing either way.
                if let Some(&index) = rule_index.get(rule_name.as_str()) {
                    rule_indices.push(index);
                }
            }

            collections.push(CompiledCollection {
                id: spec.id.clone(),
                name: spec.name.clone(),
                description: spec.description.clone(),
                display: spec.display,
                dedup: spec.dedup,
                overflow: spec.overflow,
                rule_indices,
            });
        }

        errors.into_result(CompiledSet { rules, collections })
    }

    /// Run one classification pass over a snapshot.
    ///
    /// Purely functional over its inputs: an unchanged snapshot and set
    /// yield byte-identical results. Match lists for different rules are
    /// computed in parallel; the collect preserves rule order, so
    /// parallelism never perturbs the outcome.
    pub fn classify<'a>(&self, snapshot: &'a Snapshot, now: DateTime<Utc>) -> Classification<'a> {
        let items = snapshot.items();

        let matches: Vec<Vec<usize>> = self
            .rules
            .par_iter()
            .map(|rule| {
                items
                    .iter()
                    .enumerate()
                    .filter(|(_, item)| rule.matches(item, now))
                    .map(|(index, _)| index)
                    .collect()
            })
            .collect();

        let collections = self
            .collections
            .iter()
            .map(|collection| collection.assemble(items, &self.rules, &matches))
            .collect();

        Classification { collections }
    }

    /// Compiled rules in definition order
    pub fn rules(&self) -> &[CompiledRule] {
        &self.rules
    }

    /// Compiled collections in configuration order
    pub fn collections(&self) -> &[CompiledCollection] {
        &self.collections
    }

    /// Look up one compiled rule by name.
    pub fn rule(&self, id: &str) -> Option<&CompiledRule> {
        self.rules.iter().find(|r| r.id == id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::load_config;

    fn parse(yaml: &str) -> TriageConfig {
        serde_yaml::from_str(yaml).unwrap()
    }

    #[test]
    fn test_compile_reports_every_error_at_once() {
        let config = parse(
            r#"
rules:
  bad-regex:
    name: "Broken"
    filters:
      - label: "(["
  bad-duration:
    name: "Also broken"
    filters:
      - updated: "tomorrow"
collections:
  - id: board
    name: "Board"
    overflow: 0
    rules: [bad-regex, nonexistent]
  - id: board
    name: "Board again"
    rules: []
"#,
        );

        let errors = CompiledSet::compile(&config).unwrap_err();
        let messages: Vec<String> = errors.errors().iter().map(|e| e.to_string()).collect();

        assert_eq!(errors.len(), 5, "got: {:?}", messages);
        assert!(messages.iter().any(|m| m.contains("invalid regex")));
        assert!(messages.iter().any(|m| m.contains("invalid duration")));
        assert!(messages.iter().any(|m| m.contains("unknown rule 'nonexistent'")));
        assert!(messages.iter().any(|m| m.contains("overflow must be at least 1")));
        assert!(messages.iter().any(|m| m.contains("duplicate collection id 'board'")));
    }

    #[test]
    fn test_compile_detects_duplicate_rule_names() {
        let config = parse(
            r#"
rules:
  twice:
    name: "First"
  twice:
    name: "Second"
"#,
        );
        let errors = CompiledSet::compile(&config).unwrap_err();
        assert_eq!(
            errors.errors(),
            &[ConfigError::DuplicateRule {
                rule: "twice".to_string(),
            }]
        );
    }

    #[test]
    fn test_compile_is_all_or_nothing() {
        // One broken rule fails the whole configuration even though the
        // other rule and the collection are fine
        let config = parse(
            r#"
rules:
  fine:
    name: "Fine"
    filters:
      - state: "open"
  broken:
    name: "Broken"
    filters:
      - state: "reopened"
collections:
  - id: board
    name: "Board"
    rules: [fine]
"#,
        );
        assert!(CompiledSet::compile(&config).is_err());
    }

    #[test]
    fn test_compile_succeeds_on_well_formed_config() {
        let config = parse(
            r#"
rules:
  needs-triage:
    name: "Needs triage"
    type: issue
    filters:
      - label: "!triage/.*"
collections:
  - id: daily
    name: "Daily"
    rules: [needs-triage]
"#,
        );
        let set = CompiledSet::compile(&config).unwrap();
        assert_eq!(set.rules().len(), 1);
        assert_eq!(set.collections().len(), 1);
        assert!(set.rule("needs-triage").is_some());
    }

    #[test]
    fn test_two_compilations_of_identical_text_are_equivalent() {
        let yaml = r#"
rules:
  a:
    name: "A"
    filters:
      - label: "bug"
  b:
    name: "B"
    filters:
      - state: "open"
collections:
  - id: c1
    name: "One"
    dedup: true
    rules: [a, b]
"#;
        let first = CompiledSet::compile(&parse(yaml)).unwrap();
        let second = CompiledSet::compile(&parse(yaml)).unwrap();

        let names = |set: &CompiledSet| -> Vec<String> {
            set.rules().iter().map(|r| r.id.clone()).collect()
        };
        assert_eq!(names(&first), names(&second));
        assert_eq!(first.collections()[0].rule_indices, second.collections()[0].rule_indices);
    }

    #[test]
    fn test_load_config_missing_file_errors() {
        let err = load_config(std::path::Path::new("/nonexistent/triage.yaml")).unwrap_err();
        assert!(err.to_string().contains("failed to read config file"));
    }
}
