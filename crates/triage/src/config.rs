//! Configuration loading and raw schema types.
//!
//! Configuration arrives as declarative data, from YAML (the primary format)
//! or TOML, chosen by file extension. The raw types here stay close to the
//! file schema and defer all validation to `CompiledSet::compile`, so one
//! load reports every defect instead of failing at the first.

use crate::domain::{Item, Snapshot};
use crate::DisplayMode;
use anyhow::{Context, Result};
use schemars::gen::SchemaGenerator;
use schemars::schema::Schema;
use schemars::JsonSchema;
use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;

/// Root configuration document
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct TriageConfig {
    /// Project identity and membership, consumed by the out-of-process tag
    /// derivation layer; the engine carries it opaquely
    #[serde(default)]
    pub settings: SettingsSpec,
    /// Rule definitions keyed by unique rule name
    #[serde(default)]
    pub rules: RuleMap,
    /// Ordered collection definitions
    #[serde(default)]
    pub collections: Vec<CollectionSpec>,
}

/// Opaque project settings passed through to external collaborators
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct SettingsSpec {
    /// Project display name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Source repositories to pull items from
    #[serde(default)]
    pub repos: Vec<String>,
    /// Organization roles whose members count as project members
    #[serde(default)]
    pub member_roles: Vec<String>,
    /// Explicitly listed members
    #[serde(default)]
    pub members: Vec<String>,
}

/// One rule definition as written in the configuration file
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct RuleSpec {
    /// Display string shown to maintainers
    pub name: String,
    /// Suggested remediation text
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resolution: Option<String>,
    /// Restrict to `issue` or `pull_request`; unrestricted when absent
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    /// Ordered filters, each a single `{field: pattern}` entry, combined by AND
    #[serde(default)]
    pub filters: Vec<BTreeMap<String, String>>,
}

/// One collection definition as written in the configuration file
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct CollectionSpec {
    /// Unique collection id
    pub id: String,
    /// Display string
    pub name: String,
    /// Longer description for the rendering layer
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Flat list or kanban board
    #[serde(default)]
    pub display: DisplayMode,
    /// Cap on visible matches per rule; the remainder becomes a count
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub overflow: Option<usize>,
    /// Attribute each item to the first rule that matches it
    #[serde(default)]
    pub dedup: bool,
    /// Rule names in display order
    #[serde(default)]
    pub rules: Vec<String>,
}

/// The `rules` mapping, preserving duplicate keys for later diagnosis
///
/// A plain map type would silently collapse duplicate rule names during
/// deserialization; duplicates must instead surface as a `ConfigError` from
/// compilation, so every entry is kept in file order.
#[derive(Debug, Clone, Default)]
pub struct RuleMap {
    entries: Vec<(String, RuleSpec)>,
}

impl RuleMap {
    /// Build from (name, spec) pairs, preserving order and duplicates.
    pub fn from_entries(entries: Vec<(String, RuleSpec)>) -> Self {
        RuleMap { entries }
    }

    /// All entries in file order
    pub fn entries(&self) -> &[(String, RuleSpec)] {
        &self.entries
    }

    /// Number of entries, duplicates included
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether no rules are defined
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Serialize for RuleMap {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (name, spec) in &self.entries {
            map.serialize_entry(name, spec)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for RuleMap {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct RuleMapVisitor;

        impl<'de> Visitor<'de> for RuleMapVisitor {
            type Value = RuleMap;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a mapping from rule name to rule definition")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Self::Value, A::Error> {
                let mut entries = Vec::with_capacity(access.size_hint().unwrap_or(0));
                while let Some((name, spec)) = access.next_entry::<String, RuleSpec>()? {
                    entries.push((name, spec));
                }
                Ok(RuleMap { entries })
            }
        }

        deserializer.deserialize_map(RuleMapVisitor)
    }
}

impl JsonSchema for RuleMap {
    fn schema_name() -> String {
        "RuleMap".to_string()
    }

    fn json_schema(gen: &mut SchemaGenerator) -> Schema {
        <BTreeMap<String, RuleSpec>>::json_schema(gen)
    }
}

/// Snapshot file layout consumed by the CLI
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct SnapshotFile {
    /// Work items captured at one point in time
    pub items: Vec<Item>,
}

/// Load a configuration file, choosing the codec by extension.
///
/// `.toml` parses as TOML; everything else parses as YAML (which also
/// accepts JSON).
pub fn load_config(path: &Path) -> Result<TriageConfig> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read config file {}", path.display()))?;

    match path.extension().and_then(|e| e.to_str()) {
        Some("toml") => toml::from_str(&text)
            .with_context(|| format!("failed to parse TOML config {}", path.display())),
        _ => serde_yaml::from_str(&text)
            .with_context(|| format!("failed to parse YAML config {}", path.display())),
    }
}

/// Load a JSON snapshot file into stable id order.
pub fn load_snapshot(path: &Path) -> Result<Snapshot> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read snapshot file {}", path.display()))?;
    let file: SnapshotFile = serde_json::from_str(&text)
        .with_context(|| format!("failed to parse snapshot {}", path.display()))?;
    Ok(Snapshot::from_items(file.items))
}
