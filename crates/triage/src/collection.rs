//! Collection aggregation: dedup and overflow policy over rule matches.
//!
//! A collection is an ordered sequence of rules plus a display policy. The
//! dedup fold threads an explicit claimed-item accumulator through the rules
//! in declared order, so an item is attributed to the earliest rule that
//! matches it ("first rule wins"), modeling a pipeline where each item
//! occupies exactly one stage. Overflow capping truncates each rule's
//! visible list and reports the remainder as a count, for bounded kanban
//! columns.

use crate::domain::Item;
use crate::rules::CompiledRule;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Rendering mode for a collection
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, JsonSchema,
)]
#[serde(rename_all = "snake_case")]
pub enum DisplayMode {
    /// Flat list
    #[default]
    List,
    /// Kanban board with bounded-width columns
    Kanban,
}

/// A collection with its rule references resolved to indices
#[derive(Debug, Clone)]
pub struct CompiledCollection {
    /// Unique collection id
    pub id: String,
    /// Display string
    pub name: String,
    /// Longer description for the rendering layer
    pub description: Option<String>,
    /// Flat list or kanban board
    pub display: DisplayMode,
    /// Attribute each item to the first rule that matches it
    pub dedup: bool,
    /// Cap on visible matches per rule
    pub overflow: Option<usize>,
    /// Indices into the compiled rule set, in declared order
    pub(crate) rule_indices: Vec<usize>,
}

/// Per-rule result within one collection
#[derive(Debug, Clone, PartialEq, Serialize, JsonSchema)]
pub struct RuleResult<'a> {
    /// Rule name (the unique key)
    pub rule: String,
    /// Display string
    pub name: String,
    /// Suggested remediation text
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resolution: Option<String>,
    /// Items shown after dedup and overflow capping, in snapshot order
    pub visible: Vec<&'a Item>,
    /// Raw match count, before dedup and capping; under dedup this still
    /// counts items claimed by earlier rules
    pub total: usize,
    /// Deduped matches hidden by the overflow cap
    pub overflow: usize,
}

/// Classification result for one collection
#[derive(Debug, Clone, PartialEq, Serialize, JsonSchema)]
pub struct CollectionResult<'a> {
    /// Collection id
    pub id: String,
    /// Display string
    pub name: String,
    /// Longer description for the rendering layer
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Flat list or kanban board
    pub display: DisplayMode,
    /// Per-rule results, preserving the collection's declared rule order
    pub rules: Vec<RuleResult<'a>>,
}

impl CompiledCollection {
    /// Aggregate precomputed per-rule match lists into this collection's
    /// result.
    ///
    /// `matches` is indexed by rule position in the compiled set and holds
    /// snapshot indices in stable order. The claimed-item accumulator is
    /// scoped to this call; nothing is shared across collections or passes.
    pub(crate) fn assemble<'a>(
        &self,
        items: &'a [Item],
        rules: &[CompiledRule],
        matches: &[Vec<usize>],
    ) -> CollectionResult<'a> {
        let mut claimed: HashSet<usize> = HashSet::new();
        let mut results = Vec::with_capacity(self.rule_indices.len());

        for &rule_index in &self.rule_indices {
            let rule = &rules[rule_index];
            let mut matched = matches[rule_index].clone();
            let total = matched.len();

            if self.dedup {
                matched.retain(|index| !claimed.contains(index));
                claimed.extend(matched.iter().copied());
            }

            let kept = matched.len();
            let shown = match self.overflow {
                Some(cap) => kept.min(cap),
                None => kept,
            };
            let visible = matched[..shown].iter().map(|&index| &items[index]).collect();

            results.push(RuleResult {
                rule: rule.id.clone(),
                name: rule.name.clone(),
                resolution: rule.resolution.clone(),
                visible,
                total,
                overflow: kept - shown,
            });
        }

        CollectionResult {
            id: self.id.clone(),
            name: self.name.clone(),
            description: self.description.clone(),
            display: self.display,
            rules: results,
        }
    }
}
