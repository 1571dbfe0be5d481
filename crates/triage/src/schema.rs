//! JSON Schema export for machine consumers.
//!
//! Emits schemas for the configuration file, the snapshot file, and the
//! classification result, so agents and editors can validate documents
//! without reading prose documentation.

use crate::collection::CollectionResult;
use crate::config::{SnapshotFile, TriageConfig};
use schemars::schema_for;
use serde_json::Value;

/// Which document schema to emit
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchemaTarget {
    /// The YAML/TOML configuration file
    Config,
    /// The JSON snapshot file
    Snapshot,
    /// One collection's classification result
    Result,
}

impl SchemaTarget {
    /// Parse a target name from the CLI.
    pub fn parse(s: &str) -> Option<SchemaTarget> {
        match s {
            "config" => Some(SchemaTarget::Config),
            "snapshot" => Some(SchemaTarget::Snapshot),
            "result" => Some(SchemaTarget::Result),
            _ => None,
        }
    }
}

/// Generate the JSON Schema for the requested document.
pub fn generate(target: SchemaTarget) -> Value {
    let schema = match target {
        SchemaTarget::Config => schema_for!(TriageConfig),
        SchemaTarget::Snapshot => schema_for!(SnapshotFile),
        SchemaTarget::Result => schema_for!(CollectionResult<'static>),
    };
    serde_json::to_value(schema).expect("schema serializes to JSON")
}
