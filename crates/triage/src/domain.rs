//! Core domain types for work-item classification.
//!
//! This module defines the point-in-time view of tracker work items (issues
//! and pull requests) that the engine classifies. Items arrive fully formed
//! from an external fetch layer; the engine never mutates or re-derives them.

use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::str::FromStr;

/// Kind of work item
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum ItemKind {
    /// A tracker issue
    Issue,
    /// A pull request
    PullRequest,
}

impl FromStr for ItemKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "issue" => Ok(ItemKind::Issue),
            "pull_request" => Ok(ItemKind::PullRequest),
            _ => Err(format!(
                "invalid item kind '{}' (expected 'issue' or 'pull_request')",
                s
            )),
        }
    }
}

/// Lifecycle state of a work item
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum ItemState {
    /// Still open in the tracker
    Open,
    /// Closed or merged
    Closed,
}

impl FromStr for ItemState {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "open" => Ok(ItemState::Open),
            "closed" => Ok(ItemState::Closed),
            _ => Err(format!(
                "invalid item state '{}' (expected 'open' or 'closed')",
                s
            )),
        }
    }
}

/// One work item as seen at snapshot time
///
/// Attributes are immutable for the duration of a classification pass. Tags
/// are precomputed boolean signals attached by an external derivation layer;
/// an absent tag reads as `false`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Item {
    /// Stable unique identifier within one snapshot
    pub id: String,
    /// Issue or pull request (immutable for the item's lifetime)
    pub kind: ItemKind,
    /// Free-text title
    pub title: String,
    /// Current lifecycle state
    pub state: ItemState,
    /// Label set (unordered, no duplicates)
    #[serde(default)]
    pub labels: Vec<String>,
    /// When the item was last updated
    pub updated_at: DateTime<Utc>,
    /// When the item last received a response (absent if never responded to)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_response_at: Option<DateTime<Utc>>,
    /// Precomputed boolean signals from the tag derivation layer
    #[serde(default)]
    pub tags: HashMap<String, bool>,
}

impl Item {
    /// Look up a tag value; absent tags are `false`.
    pub fn tag(&self, name: &str) -> bool {
        self.tags.get(name).copied().unwrap_or(false)
    }
}

/// An immutable, point-in-time set of work items
///
/// Items are held in ascending id order so every classification pass iterates
/// deterministically. Unique ids within one snapshot are a precondition owned
/// by the fetch layer.
#[derive(Debug, Clone, PartialEq, Serialize, JsonSchema)]
pub struct Snapshot {
    items: Vec<Item>,
}

impl Snapshot {
    /// Build a snapshot, sorting items into stable id order.
    pub fn from_items(mut items: Vec<Item>) -> Self {
        items.sort_by(|a, b| a.id.cmp(&b.id));
        Snapshot { items }
    }

    /// Items in stable id order
    pub fn items(&self) -> &[Item] {
        &self.items
    }

    /// Number of items in the snapshot
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Whether the snapshot holds no items
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}
