//! Hierarchy node domain model.
//!
//! Nodes form the organizational tree. Each node carries an optional
//! parent reference; children are derived (all nodes whose `parent_id`
//! equals the node), never stored. Nothing at write time guarantees the
//! parent relation is acyclic, so every traversal carries its own
//! cycle guard.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A node in the organizational tree.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HierarchyNode {
    pub id: Uuid,
    /// Human-readable name (e.g., `Operations`, `North Region`).
    pub name: String,
    /// Parent node, if any. `None` marks a root.
    pub parent_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateHierarchyNode {
    pub name: String,
    pub parent_id: Option<Uuid>,
}

/// `parent_id` uses `Some(Some(id))` = reparent, `Some(None)` = detach
/// to root, `None` = no change.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct UpdateHierarchyNode {
    pub name: Option<String>,
    pub parent_id: Option<Option<Uuid>>,
}
