//! Filter compilation: field/pattern pairs into typed matchers.
//!
//! A filter is pure data (a field selector plus a pattern string) until it
//! is compiled here into a `Matcher`, a typed predicate over a single item.
//! Compilation happens once at configuration load and never depends on any
//! item; evaluation is total over any well-formed item and cannot fail.

mod duration;

pub use duration::DurationWindow;

use crate::domain::{Item, ItemState};
use crate::errors::ConfigError;
use chrono::{DateTime, Utc};
use regex::Regex;
use std::str::FromStr;

/// Field selector for a filter
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    /// Regex over the item's label set (any label matches)
    Label,
    /// Precomputed boolean tag, or alternation of tags
    Tag,
    /// Regex over the full title text
    Title,
    /// Lifecycle state, exactly `open` or `closed`
    State,
    /// Signed duration against `updated_at`
    Updated,
    /// Signed duration against `last_response_at`
    Responded,
}

impl Field {
    /// Parse a field selector from configuration.
    pub fn parse(s: &str) -> Option<Field> {
        match s {
            "label" => Some(Field::Label),
            "tag" => Some(Field::Tag),
            "title" => Some(Field::Title),
            "state" => Some(Field::State),
            "updated" => Some(Field::Updated),
            "responded" => Some(Field::Responded),
            _ => None,
        }
    }
}

/// A compiled predicate over a single item
///
/// The string pattern grammar (leading `!` for negation, parenthesized
/// alternation for OR) is resolved here into explicit variants, so the
/// evaluator carries no string parsing at all.
#[derive(Debug, Clone)]
pub enum Matcher {
    /// True iff any/no label matches the regex
    Label { negated: bool, regex: Regex },
    /// True iff any/none of the named tags is true
    Tag { negated: bool, names: Vec<String> },
    /// True iff the title does/does not match the regex
    Title { negated: bool, regex: Regex },
    /// True iff the lifecycle state is equal
    State(ItemState),
    /// Window against `updated_at`
    Updated(DurationWindow),
    /// Window against `last_response_at`; a never-responded item is
    /// infinitely long ago
    Responded(DurationWindow),
}

impl Matcher {
    /// Compile one filter for the named rule.
    ///
    /// `rule` and `index` only locate the filter in error messages; the
    /// compiled matcher carries no trace of its origin.
    pub fn compile(
        rule: &str,
        index: usize,
        field: Field,
        pattern: &str,
    ) -> Result<Matcher, ConfigError> {
        match field {
            Field::Label => {
                let (negated, inner) = strip_negation(pattern);
                let regex = compile_regex(rule, index, inner)?;
                Ok(Matcher::Label { negated, regex })
            }
            Field::Title => {
                let (negated, inner) = strip_negation(pattern);
                let regex = compile_regex(rule, index, inner)?;
                Ok(Matcher::Title { negated, regex })
            }
            Field::Tag => {
                let (negated, inner) = strip_negation(pattern);
                let names = parse_tag_names(inner).map_err(|reason| {
                    ConfigError::InvalidTagPattern {
                        rule: rule.to_string(),
                        index,
                        pattern: pattern.to_string(),
                        reason,
                    }
                })?;
                Ok(Matcher::Tag { negated, names })
            }
            Field::State => match ItemState::from_str(pattern) {
                Ok(state) => Ok(Matcher::State(state)),
                Err(_) => Err(ConfigError::InvalidState {
                    rule: rule.to_string(),
                    index,
                    pattern: pattern.to_string(),
                }),
            },
            Field::Updated => {
                let window = parse_window(rule, index, pattern)?;
                Ok(Matcher::Updated(window))
            }
            Field::Responded => {
                let window = parse_window(rule, index, pattern)?;
                Ok(Matcher::Responded(window))
            }
        }
    }

    /// Evaluate this matcher against one item at `now`.
    pub fn matches(&self, item: &Item, now: DateTime<Utc>) -> bool {
        match self {
            Matcher::Label { negated, regex } => {
                let hit = item.labels.iter().any(|label| regex.is_match(label));
                hit != *negated
            }
            Matcher::Tag { negated, names } => {
                let hit = names.iter().any(|name| item.tag(name));
                hit != *negated
            }
            Matcher::Title { negated, regex } => regex.is_match(&item.title) != *negated,
            Matcher::State(state) => item.state == *state,
            Matcher::Updated(window) => window.contains(item.updated_at, now),
            Matcher::Responded(window) => match item.last_response_at {
                Some(ts) => window.contains(ts, now),
                None => window.matches_missing(),
            },
        }
    }
}

/// Split a leading `!` sentinel off a pattern.
fn strip_negation(pattern: &str) -> (bool, &str) {
    match pattern.strip_prefix('!') {
        Some(inner) => (true, inner),
        None => (false, pattern),
    }
}

fn compile_regex(rule: &str, index: usize, pattern: &str) -> Result<Regex, ConfigError> {
    Regex::new(pattern).map_err(|e| ConfigError::InvalidRegex {
        rule: rule.to_string(),
        index,
        pattern: pattern.to_string(),
        message: e.to_string(),
    })
}

fn parse_window(rule: &str, index: usize, pattern: &str) -> Result<DurationWindow, ConfigError> {
    DurationWindow::parse(pattern).ok_or_else(|| ConfigError::InvalidDuration {
        rule: rule.to_string(),
        index,
        pattern: pattern.to_string(),
    })
}

/// Parse a tag pattern into its constituent names.
///
/// Accepts a bare name or a parenthesized alternation `(a|b|c)`. The tag
/// vocabulary itself is open; names are never validated against a catalog.
fn parse_tag_names(pattern: &str) -> Result<Vec<String>, String> {
    if let Some(rest) = pattern.strip_prefix('(') {
        let inner = rest
            .strip_suffix(')')
            .ok_or_else(|| "unbalanced parenthesis".to_string())?;
        let names: Vec<String> = inner.split('|').map(|n| n.trim().to_string()).collect();
        if names.iter().any(|n| n.is_empty()) {
            return Err("empty alternation branch".to_string());
        }
        Ok(names)
    } else if pattern.contains(['(', ')', '|']) {
        Err("alternation must be parenthesized".to_string())
    } else if pattern.is_empty() {
        Err("empty tag name".to_string())
    } else {
        Ok(vec![pattern.to_string()])
    }
}
