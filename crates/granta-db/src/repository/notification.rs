//! SurrealDB implementation of [`NotificationRepository`].
//!
//! The notification table is an append-only log: rows are created by
//! `append`, only the `is_read` flag is ever mutated, and listings are
//! newest-first.

use chrono::{DateTime, Utc};
use granta_core::error::GrantaResult;
use granta_core::models::notification::{AppendNotification, Notification};
use granta_core::repository::NotificationRepository;
use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;
use uuid::Uuid;

use crate::error::DbError;

/// DB-side row struct for queries where the UUID is already known.
#[derive(Debug, SurrealValue)]
struct NotificationRow {
    user_id: String,
    message: String,
    origin_node_id: Option<String>,
    is_read: bool,
    created_at: DateTime<Utc>,
}

/// DB-side row struct that includes the record ID via `meta::id(id)`.
#[derive(Debug, SurrealValue)]
struct NotificationRowWithId {
    record_id: String,
    user_id: String,
    message: String,
    origin_node_id: Option<String>,
    is_read: bool,
    created_at: DateTime<Utc>,
}

fn parse_origin(origin_node_id: Option<String>) -> Result<Option<Uuid>, DbError> {
    origin_node_id
        .map(|n| {
            Uuid::parse_str(&n).map_err(|e| DbError::Decode(format!("invalid origin UUID: {e}")))
        })
        .transpose()
}

impl NotificationRow {
    fn try_into_notification(self, id: Uuid) -> Result<Notification, DbError> {
        let user_id = Uuid::parse_str(&self.user_id)
            .map_err(|e| DbError::Decode(format!("invalid user UUID: {e}")))?;
        Ok(Notification {
            id,
            message: self.message,
            user_id,
            origin_node_id: parse_origin(self.origin_node_id)?,
            read: self.is_read,
            created_at: self.created_at,
        })
    }
}

impl NotificationRowWithId {
    fn try_into_notification(self) -> Result<Notification, DbError> {
        let id = Uuid::parse_str(&self.record_id)
            .map_err(|e| DbError::Decode(format!("invalid UUID: {e}")))?;
        let user_id = Uuid::parse_str(&self.user_id)
            .map_err(|e| DbError::Decode(format!("invalid user UUID: {e}")))?;
        Ok(Notification {
            id,
            message: self.message,
            user_id,
            origin_node_id: parse_origin(self.origin_node_id)?,
            read: self.is_read,
            created_at: self.created_at,
        })
    }
}

/// SurrealDB implementation of the notification repository.
#[derive(Clone)]
pub struct SurrealNotificationRepository<C: Connection> {
    db: Surreal<C>,
}

impl<C: Connection> SurrealNotificationRepository<C> {
    pub fn new(db: Surreal<C>) -> Self {
        Self { db }
    }
}

impl<C: Connection> NotificationRepository for SurrealNotificationRepository<C> {
    async fn append(&self, input: AppendNotification) -> GrantaResult<Notification> {
        let id = Uuid::new_v4();
        let id_str = id.to_string();

        let mut sets = vec!["user_id = $user_id", "message = $message"];
        if input.origin_node_id.is_some() {
            sets.push("origin_node_id = $origin_node_id");
        }

        let query = format!(
            "CREATE type::record('notification', $id) SET {}",
            sets.join(", ")
        );

        let mut builder = self
            .db
            .query(&query)
            .bind(("id", id_str.clone()))
            .bind(("user_id", input.user_id.to_string()))
            .bind(("message", input.message));

        if let Some(origin) = input.origin_node_id {
            builder = builder.bind(("origin_node_id", origin.to_string()));
        }

        let result = builder.await.map_err(DbError::from)?;
        let mut result = result.check().map_err(|e| DbError::Query(e.to_string()))?;

        let rows: Vec<NotificationRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "notification".into(),
            id: id_str,
        })?;

        Ok(row.try_into_notification(id)?)
    }

    async fn get_by_id(&self, id: Uuid) -> GrantaResult<Option<Notification>> {
        let mut result = self
            .db
            .query("SELECT * FROM type::record('notification', $id)")
            .bind(("id", id.to_string()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<NotificationRow> = result.take(0).map_err(DbError::from)?;

        match rows.into_iter().next() {
            Some(row) => Ok(Some(row.try_into_notification(id)?)),
            None => Ok(None),
        }
    }

    async fn list(&self) -> GrantaResult<Vec<Notification>> {
        let mut result = self
            .db
            .query(
                "SELECT meta::id(id) AS record_id, * FROM notification \
                 ORDER BY created_at DESC",
            )
            .await
            .map_err(DbError::from)?;

        let rows: Vec<NotificationRowWithId> = result.take(0).map_err(DbError::from)?;

        let notifications = rows
            .into_iter()
            .map(|row| row.try_into_notification())
            .collect::<Result<Vec<_>, DbError>>()?;

        Ok(notifications)
    }

    async fn list_by_user(&self, user_id: Uuid, only_unread: bool) -> GrantaResult<Vec<Notification>> {
        let query = if only_unread {
            "SELECT meta::id(id) AS record_id, * FROM notification \
             WHERE user_id = $user_id AND is_read = false \
             ORDER BY created_at DESC"
        } else {
            "SELECT meta::id(id) AS record_id, * FROM notification \
             WHERE user_id = $user_id \
             ORDER BY created_at DESC"
        };

        let mut result = self
            .db
            .query(query)
            .bind(("user_id", user_id.to_string()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<NotificationRowWithId> = result.take(0).map_err(DbError::from)?;

        let notifications = rows
            .into_iter()
            .map(|row| row.try_into_notification())
            .collect::<Result<Vec<_>, DbError>>()?;

        Ok(notifications)
    }

    async fn delete(&self, id: Uuid) -> GrantaResult<bool> {
        let mut result = self
            .db
            .query("DELETE type::record('notification', $id) RETURN BEFORE")
            .bind(("id", id.to_string()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<NotificationRow> = result.take(0).map_err(DbError::from)?;
        Ok(!rows.is_empty())
    }

    async fn mark_read(&self, id: Uuid) -> GrantaResult<bool> {
        // Idempotent: an already-read row is updated to the same
        // state and still reported as existing.
        let mut result = self
            .db
            .query(
                "UPDATE type::record('notification', $id) \
                 SET is_read = true RETURN AFTER",
            )
            .bind(("id", id.to_string()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<NotificationRow> = result.take(0).map_err(DbError::from)?;
        Ok(!rows.is_empty())
    }

    async fn mark_all_read(&self, user_id: Uuid) -> GrantaResult<u64> {
        let mut result = self
            .db
            .query(
                "UPDATE notification SET is_read = true \
                 WHERE user_id = $user_id AND is_read = false \
                 RETURN AFTER",
            )
            .bind(("user_id", user_id.to_string()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<NotificationRow> = result.take(0).map_err(DbError::from)?;
        Ok(rows.len() as u64)
    }
}
