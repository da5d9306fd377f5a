//! RoutingPlan - Config Loader output
//!
//! Describes the full routing topology: writer instances, failover
//! categories with priority-ordered writer bindings, and channel bindings.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::WriterId;

/// Unique failover category identifier
pub type CategoryId = u32;

/// Complete routing topology
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoutingPlan {
    /// Failover defaults
    #[serde(default)]
    pub failover: FailoverSettings,

    /// Writer instance definitions
    pub writers: Vec<WriterSpec>,

    /// Failover categories
    pub categories: Vec<CategorySpec>,
}

/// Workspace-wide failover defaults
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FailoverSettings {
    /// Duration a failed writer stays disabled before automatic re-enable,
    /// in milliseconds
    #[serde(default = "default_cooldown_ms")]
    pub cooldown_ms: u64,
}

impl Default for FailoverSettings {
    fn default() -> Self {
        Self {
            cooldown_ms: default_cooldown_ms(),
        }
    }
}

fn default_cooldown_ms() -> u64 {
    30_000
}

/// One writer instance to construct through the registry
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WriterSpec {
    /// Unique identifier
    pub id: WriterId,

    /// Registry kind tag (e.g. "console", "file")
    pub kind: String,

    /// Writer-specific settings
    #[serde(default)]
    pub params: HashMap<String, String>,
}

/// One failover category: an ordered chain of writers serving channels
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategorySpec {
    /// Unique identifier
    pub id: CategoryId,

    /// Per-category cooldown override, in milliseconds
    #[serde(default)]
    pub cooldown_ms: Option<u64>,

    /// Channels routed to this category
    #[serde(default)]
    pub channels: Vec<String>,

    /// Writer bindings (priority descending decides failover order)
    pub writers: Vec<WriterBinding>,
}

/// A writer reference with its priority within one category
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct WriterBinding {
    /// Writer identifier (must match a [`WriterSpec`])
    pub id: WriterId,

    /// Higher priority is attempted first
    pub priority: i32,
}
