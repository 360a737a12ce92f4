//! SurrealDB implementation of [`GrantRepository`].
//!
//! The two-variant grant target is stored as a `target_kind`
//! discriminant plus a `target_id` column; rows with any other kind
//! are rejected by the schema ASSERT.

use chrono::{DateTime, Utc};
use granta_core::error::GrantaResult;
use granta_core::models::grant::{CreateGrant, Grant, GrantTarget, UpdateGrant};
use granta_core::models::permission::Permission;
use granta_core::repository::GrantRepository;
use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;
use uuid::Uuid;

use crate::error::DbError;
use crate::repository::permission::PermissionRowWithId;

const KIND_USER: &str = "User";
const KIND_NODE: &str = "Node";

fn kind_of(target: &GrantTarget) -> &'static str {
    match target {
        GrantTarget::User(_) => KIND_USER,
        GrantTarget::Node(_) => KIND_NODE,
    }
}

fn target_id_of(target: &GrantTarget) -> String {
    match target {
        GrantTarget::User(id) | GrantTarget::Node(id) => id.to_string(),
    }
}

fn parse_target(kind: &str, target_id: &str) -> Result<GrantTarget, DbError> {
    let id = Uuid::parse_str(target_id)
        .map_err(|e| DbError::Decode(format!("invalid target UUID: {e}")))?;
    match kind {
        KIND_USER => Ok(GrantTarget::User(id)),
        KIND_NODE => Ok(GrantTarget::Node(id)),
        other => Err(DbError::Decode(format!("unknown grant target kind: {other}"))),
    }
}

/// DB-side row struct for queries where the UUID is already known.
#[derive(Debug, SurrealValue)]
struct GrantRow {
    permission_id: String,
    target_kind: String,
    target_id: String,
    assigned_at: DateTime<Utc>,
}

/// DB-side row struct that includes the record ID via `meta::id(id)`.
#[derive(Debug, SurrealValue)]
struct GrantRowWithId {
    record_id: String,
    permission_id: String,
    target_kind: String,
    target_id: String,
    assigned_at: DateTime<Utc>,
}

impl GrantRow {
    fn try_into_grant(self, id: Uuid) -> Result<Grant, DbError> {
        let permission_id = Uuid::parse_str(&self.permission_id)
            .map_err(|e| DbError::Decode(format!("invalid permission UUID: {e}")))?;
        Ok(Grant {
            id,
            permission_id,
            target: parse_target(&self.target_kind, &self.target_id)?,
            assigned_at: self.assigned_at,
        })
    }
}

impl GrantRowWithId {
    fn try_into_grant(self) -> Result<Grant, DbError> {
        let id = Uuid::parse_str(&self.record_id)
            .map_err(|e| DbError::Decode(format!("invalid UUID: {e}")))?;
        let permission_id = Uuid::parse_str(&self.permission_id)
            .map_err(|e| DbError::Decode(format!("invalid permission UUID: {e}")))?;
        Ok(Grant {
            id,
            permission_id,
            target: parse_target(&self.target_kind, &self.target_id)?,
            assigned_at: self.assigned_at,
        })
    }
}

/// SurrealDB implementation of the grant repository.
#[derive(Clone)]
pub struct SurrealGrantRepository<C: Connection> {
    db: Surreal<C>,
}

impl<C: Connection> SurrealGrantRepository<C> {
    pub fn new(db: Surreal<C>) -> Self {
        Self { db }
    }

    /// Permissions from grants whose (kind, target) pair matches
    /// exactly. No hierarchy traversal on purpose: permission lookup
    /// is direct-only even though notification fan-out is recursive.
    async fn permissions_for_target(
        &self,
        kind: &'static str,
        target_id: Uuid,
    ) -> GrantaResult<Vec<Permission>> {
        let mut result = self
            .db
            .query(
                "SELECT meta::id(id) AS record_id, * FROM permission \
                 WHERE id IN (\
                     SELECT VALUE type::record('permission', permission_id) \
                     FROM permission_grant \
                     WHERE target_kind = $kind AND target_id = $target_id\
                 )",
            )
            .bind(("kind", kind))
            .bind(("target_id", target_id.to_string()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<PermissionRowWithId> = result.take(0).map_err(DbError::from)?;

        let permissions = rows
            .into_iter()
            .map(|row| row.try_into_permission())
            .collect::<Result<Vec<_>, DbError>>()?;

        Ok(permissions)
    }
}

impl<C: Connection> GrantRepository for SurrealGrantRepository<C> {
    async fn create(&self, input: CreateGrant) -> GrantaResult<Grant> {
        let id = Uuid::new_v4();
        let id_str = id.to_string();

        let result = self
            .db
            .query(
                "CREATE type::record('permission_grant', $id) SET \
                 permission_id = $permission_id, \
                 target_kind = $target_kind, target_id = $target_id",
            )
            .bind(("id", id_str.clone()))
            .bind(("permission_id", input.permission_id.to_string()))
            .bind(("target_kind", kind_of(&input.target)))
            .bind(("target_id", target_id_of(&input.target)))
            .await
            .map_err(DbError::from)?;

        let mut result = result.check().map_err(|e| DbError::Query(e.to_string()))?;

        let rows: Vec<GrantRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "permission_grant".into(),
            id: id_str,
        })?;

        Ok(row.try_into_grant(id)?)
    }

    async fn get_by_id(&self, id: Uuid) -> GrantaResult<Option<Grant>> {
        let mut result = self
            .db
            .query("SELECT * FROM type::record('permission_grant', $id)")
            .bind(("id", id.to_string()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<GrantRow> = result.take(0).map_err(DbError::from)?;

        match rows.into_iter().next() {
            Some(row) => Ok(Some(row.try_into_grant(id)?)),
            None => Ok(None),
        }
    }

    async fn update(&self, id: Uuid, input: UpdateGrant) -> GrantaResult<Option<Grant>> {
        let id_str = id.to_string();

        let mut sets = Vec::new();
        if input.permission_id.is_some() {
            sets.push("permission_id = $permission_id");
        }
        if input.target.is_some() {
            sets.push("target_kind = $target_kind");
            sets.push("target_id = $target_id");
        }
        if sets.is_empty() {
            // Nothing to replace; report current state.
            return self.get_by_id(id).await;
        }

        let query = format!(
            "UPDATE type::record('permission_grant', $id) SET {}",
            sets.join(", ")
        );

        let mut builder = self.db.query(&query).bind(("id", id_str));

        if let Some(permission_id) = input.permission_id {
            builder = builder.bind(("permission_id", permission_id.to_string()));
        }
        if let Some(target) = input.target {
            builder = builder
                .bind(("target_kind", kind_of(&target)))
                .bind(("target_id", target_id_of(&target)));
        }

        let result = builder.await.map_err(DbError::from)?;
        let mut result = result.check().map_err(|e| DbError::Query(e.to_string()))?;

        let rows: Vec<GrantRow> = result.take(0).map_err(DbError::from)?;

        match rows.into_iter().next() {
            Some(row) => Ok(Some(row.try_into_grant(id)?)),
            None => Ok(None),
        }
    }

    async fn delete(&self, id: Uuid) -> GrantaResult<bool> {
        let mut result = self
            .db
            .query("DELETE type::record('permission_grant', $id) RETURN BEFORE")
            .bind(("id", id.to_string()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<GrantRow> = result.take(0).map_err(DbError::from)?;
        Ok(!rows.is_empty())
    }

    async fn list(&self) -> GrantaResult<Vec<Grant>> {
        let mut result = self
            .db
            .query(
                "SELECT meta::id(id) AS record_id, * FROM permission_grant \
                 ORDER BY assigned_at ASC",
            )
            .await
            .map_err(DbError::from)?;

        let rows: Vec<GrantRowWithId> = result.take(0).map_err(DbError::from)?;

        let grants = rows
            .into_iter()
            .map(|row| row.try_into_grant())
            .collect::<Result<Vec<_>, DbError>>()?;

        Ok(grants)
    }

    async fn permissions_for_user(&self, user_id: Uuid) -> GrantaResult<Vec<Permission>> {
        self.permissions_for_target(KIND_USER, user_id).await
    }

    async fn permissions_for_node(&self, node_id: Uuid) -> GrantaResult<Vec<Permission>> {
        self.permissions_for_target(KIND_NODE, node_id).await
    }
}
