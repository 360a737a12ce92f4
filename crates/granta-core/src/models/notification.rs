//! Notification domain model.
//!
//! A notification always addresses a concrete user; node-targeted
//! requests are expanded to individual users before any row is
//! created. The only mutation ever applied is flipping the `read`
//! flag, and `unread -> read` is terminal.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Notification {
    pub id: Uuid,
    pub message: String,
    /// The recipient. Always a concrete user, never a node.
    pub user_id: Uuid,
    /// The hierarchy node whose fan-out produced this notification.
    /// `None` for direct user notifications.
    pub origin_node_id: Option<Uuid>,
    pub read: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppendNotification {
    pub user_id: Uuid,
    pub message: String,
    pub origin_node_id: Option<Uuid>,
}
