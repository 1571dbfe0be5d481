//! Rule compilation and evaluation.
//!
//! A rule is a named conjunction of filters, optionally restricted to one
//! item kind. Evaluation is pure and total: the kind restriction short-
//! circuits before any filter runs, and filters evaluate in declaration
//! order with AND short-circuit. There is no OR between filters, only
//! inside a single pattern via alternation syntax.

use crate::config::RuleSpec;
use crate::domain::{Item, ItemKind};
use crate::errors::{ConfigError, ConfigErrors};
use crate::filter::{Field, Matcher};
use chrono::{DateTime, Utc};
use std::str::FromStr;

/// A rule with all of its filters compiled
#[derive(Debug, Clone)]
pub struct CompiledRule {
    /// Unique rule name (the key in the `rules` mapping)
    pub id: String,
    /// Display string shown to maintainers
    pub name: String,
    /// Suggested remediation text
    pub resolution: Option<String>,
    /// Restrict matching to one item kind
    pub kind: Option<ItemKind>,
    matchers: Vec<Matcher>,
}

impl CompiledRule {
    /// Compile one rule definition, recording every defect in `errors`.
    ///
    /// Returns `None` when any filter failed to compile; the caller is
    /// already committed to failing the whole configuration in that case.
    pub fn compile(id: &str, spec: &RuleSpec, errors: &mut ConfigErrors) -> Option<CompiledRule> {
        let before = errors.len();

        let kind = match &spec.kind {
            Some(value) => match ItemKind::from_str(value) {
                Ok(kind) => Some(kind),
                Err(_) => {
                    errors.push(ConfigError::InvalidRuleType {
                        rule: id.to_string(),
                        value: value.clone(),
                    });
                    None
                }
            },
            None => None,
        };

        let mut matchers = Vec::with_capacity(spec.filters.len());
        for (index, entry) in spec.filters.iter().enumerate() {
            if entry.len() != 1 {
                errors.push(ConfigError::AmbiguousFilter {
                    rule: id.to_string(),
                    index,
                    count: entry.len(),
                });
                continue;
            }
            let (field_name, pattern) = entry.iter().next().expect("entry has one element");

            let Some(field) = Field::parse(field_name) else {
                errors.push(ConfigError::UnknownField {
                    rule: id.to_string(),
                    index,
                    field: field_name.clone(),
                });
                continue;
            };

            match Matcher::compile(id, index, field, pattern) {
                Ok(matcher) => matchers.push(matcher),
                Err(error) => errors.push(error),
            }
        }

        if errors.len() > before {
            return None;
        }

        Some(CompiledRule {
            id: id.to_string(),
            name: spec.name.clone(),
            resolution: spec.resolution.clone(),
            kind,
            matchers,
        })
    }

    /// Check whether an item satisfies this rule.
    ///
    /// The kind restriction is checked first, so filters never see an item
    /// of the wrong kind; each filter then evaluates in declaration order
    /// and the first false predicate decides.
    pub fn matches(&self, item: &Item, now: DateTime<Utc>) -> bool {
        if let Some(kind) = self.kind {
            if item.kind != kind {
                return false;
            }
        }
        self.matchers.iter().all(|matcher| matcher.matches(item, now))
    }

    /// Number of compiled filters
    pub fn filter_count(&self) -> usize {
        self.matchers.len()
    }
}
