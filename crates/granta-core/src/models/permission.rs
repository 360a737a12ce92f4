//! Permission domain model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Permission {
    pub id: Uuid,
    /// Unique machine code (e.g., `reports.export`).
    pub code: String,
    /// Human-readable description, embedded in grant notifications.
    pub description: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreatePermission {
    pub code: String,
    pub description: String,
}

/// Updates touch code/description text only; identity is immutable.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct UpdatePermission {
    pub code: Option<String>,
    pub description: Option<String>,
}
