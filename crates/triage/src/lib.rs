//! Triage Board Engine Library
//!
//! Classifies tracker work items (issues and pull requests) into named,
//! human-meaningful buckets using a declarative rule language: filters
//! compose into rules, rules into collections with list or kanban display
//! policies, dedup, and overflow capping. Classification is deterministic
//! and repeatable over an immutable item snapshot.

pub mod cli;
pub mod collection;
pub mod config;
pub mod domain;
pub mod engine;
pub mod errors;
pub mod filter;
pub mod output;
pub mod rules;
pub mod schema;

// Re-export commonly used types
pub use collection::{CollectionResult, DisplayMode, RuleResult};
pub use config::{load_config, load_snapshot, TriageConfig};
pub use domain::{Item, ItemKind, ItemState, Snapshot};
pub use engine::{Classification, CompiledSet};
pub use errors::{ConfigError, ConfigErrors};
pub use output::{ExitCode, JsonError, JsonOutput};
