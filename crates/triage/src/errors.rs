//! Configuration error taxonomy.
//!
//! Every configuration problem is fatal at load time. Compilation collects
//! all detected errors before failing, so an operator can fix a whole
//! configuration in one edit cycle instead of replaying it error by error.
//! Each error names the owning rule or collection and the offending filter.

use std::fmt;
use thiserror::Error;

/// One configuration defect detected during compilation
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// A label or title pattern failed regex compilation
    #[error("rule '{rule}', filter #{index}: invalid regex '{pattern}': {message}")]
    InvalidRegex {
        rule: String,
        index: usize,
        pattern: String,
        message: String,
    },
    /// An `updated`/`responded` pattern is not a signed duration
    #[error("rule '{rule}', filter #{index}: invalid duration '{pattern}' (expected e.g. '+7d' or '-30d')")]
    InvalidDuration {
        rule: String,
        index: usize,
        pattern: String,
    },
    /// A tag pattern is not a name or parenthesized alternation
    #[error("rule '{rule}', filter #{index}: invalid tag pattern '{pattern}': {reason}")]
    InvalidTagPattern {
        rule: String,
        index: usize,
        pattern: String,
        reason: String,
    },
    /// A state pattern is neither `open` nor `closed`
    #[error("rule '{rule}', filter #{index}: invalid state '{pattern}' (expected 'open' or 'closed')")]
    InvalidState {
        rule: String,
        index: usize,
        pattern: String,
    },
    /// A filter names a field the engine does not know
    #[error("rule '{rule}', filter #{index}: unknown field '{field}' (expected label, tag, title, state, updated, or responded)")]
    UnknownField {
        rule: String,
        index: usize,
        field: String,
    },
    /// A filter entry carries zero or several fields
    #[error("rule '{rule}', filter #{index}: a filter must have exactly one field, found {count}")]
    AmbiguousFilter {
        rule: String,
        index: usize,
        count: usize,
    },
    /// A rule restricts to a kind that is neither issue nor pull_request
    #[error("rule '{rule}': invalid type '{value}' (expected 'issue' or 'pull_request')")]
    InvalidRuleType { rule: String, value: String },
    /// Two rules share one name
    #[error("duplicate rule name '{rule}'")]
    DuplicateRule { rule: String },
    /// A collection references a rule that does not exist
    #[error("collection '{collection}': unknown rule '{rule}'")]
    UnknownRule { collection: String, rule: String },
    /// Two collections share one id
    #[error("duplicate collection id '{collection}'")]
    DuplicateCollection { collection: String },
    /// An overflow cap that can never show anything
    #[error("collection '{collection}': overflow must be at least 1")]
    InvalidOverflow { collection: String },
}

/// Every error found in one compilation pass
///
/// Compilation is all-or-nothing: either a complete compiled set or the full
/// list of defects, never a partial best-effort result.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ConfigErrors {
    errors: Vec<ConfigError>,
}

impl ConfigErrors {
    /// Create an empty error collection
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one error
    pub fn push(&mut self, error: ConfigError) {
        self.errors.push(error);
    }

    /// Whether no errors were recorded
    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    /// Number of recorded errors
    pub fn len(&self) -> usize {
        self.errors.len()
    }

    /// All recorded errors, in detection order
    pub fn errors(&self) -> &[ConfigError] {
        &self.errors
    }

    /// Turn an accumulated collection into a compile result.
    pub fn into_result<T>(self, value: T) -> Result<T, ConfigErrors> {
        if self.is_empty() {
            Ok(value)
        } else {
            Err(self)
        }
    }
}

impl fmt::Display for ConfigErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{} configuration error(s):", self.errors.len())?;
        for error in &self.errors {
            writeln!(f, "  - {}", error)?;
        }
        Ok(())
    }
}

impl std::error::Error for ConfigErrors {}

impl IntoIterator for ConfigErrors {
    type Item = ConfigError;
    type IntoIter = std::vec::IntoIter<ConfigError>;

    fn into_iter(self) -> Self::IntoIter {
        self.errors.into_iter()
    }
}
