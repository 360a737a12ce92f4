//! User domain model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    pub username: String,
    pub display_name: String,
    /// The hierarchy node this user is directly attached to, if any.
    /// Fan-out reaches a user through this attachment only.
    pub hierarchy_node_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateUser {
    pub username: String,
    pub display_name: String,
    pub hierarchy_node_id: Option<Uuid>,
}

/// `hierarchy_node_id` uses `Some(Some(id))` = attach, `Some(None)` =
/// detach, `None` = no change.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct UpdateUser {
    pub username: Option<String>,
    pub display_name: Option<String>,
    pub hierarchy_node_id: Option<Option<Uuid>>,
}
