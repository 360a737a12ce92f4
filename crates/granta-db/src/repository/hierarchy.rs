//! SurrealDB implementation of [`HierarchyNodeRepository`].

use chrono::{DateTime, Utc};
use granta_core::error::{GrantaError, GrantaResult};
use granta_core::models::hierarchy::{CreateHierarchyNode, HierarchyNode, UpdateHierarchyNode};
use granta_core::repository::HierarchyNodeRepository;
use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;
use uuid::Uuid;

use crate::error::DbError;

/// DB-side row struct for queries where the UUID is already known.
#[derive(Debug, SurrealValue)]
struct HierarchyNodeRow {
    name: String,
    parent_id: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

/// DB-side row struct that includes the record ID via `meta::id(id)`.
#[derive(Debug, SurrealValue)]
struct HierarchyNodeRowWithId {
    record_id: String,
    name: String,
    parent_id: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

fn parse_parent(parent_id: Option<String>) -> Result<Option<Uuid>, DbError> {
    parent_id
        .map(|p| {
            Uuid::parse_str(&p).map_err(|e| DbError::Decode(format!("invalid parent UUID: {e}")))
        })
        .transpose()
}

impl HierarchyNodeRow {
    fn try_into_node(self, id: Uuid) -> Result<HierarchyNode, DbError> {
        Ok(HierarchyNode {
            id,
            name: self.name,
            parent_id: parse_parent(self.parent_id)?,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

impl HierarchyNodeRowWithId {
    fn try_into_node(self) -> Result<HierarchyNode, DbError> {
        let id = Uuid::parse_str(&self.record_id)
            .map_err(|e| DbError::Decode(format!("invalid UUID: {e}")))?;
        Ok(HierarchyNode {
            id,
            name: self.name,
            parent_id: parse_parent(self.parent_id)?,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

/// Row struct for count queries.
#[derive(Debug, SurrealValue)]
struct CountRow {
    total: u64,
}

/// SurrealDB implementation of the hierarchy node repository.
#[derive(Clone)]
pub struct SurrealHierarchyNodeRepository<C: Connection> {
    db: Surreal<C>,
}

impl<C: Connection> SurrealHierarchyNodeRepository<C> {
    pub fn new(db: Surreal<C>) -> Self {
        Self { db }
    }

    async fn count_where(&self, query: &'static str, id_str: String) -> Result<u64, DbError> {
        let mut result = self.db.query(query).bind(("id", id_str)).await?;
        let rows: Vec<CountRow> = result.take(0)?;
        Ok(rows.first().map(|r| r.total).unwrap_or(0))
    }
}

impl<C: Connection> HierarchyNodeRepository for SurrealHierarchyNodeRepository<C> {
    async fn create(&self, input: CreateHierarchyNode) -> GrantaResult<HierarchyNode> {
        let id = Uuid::new_v4();
        let id_str = id.to_string();

        let mut sets = vec!["name = $name"];
        if input.parent_id.is_some() {
            sets.push("parent_id = $parent_id");
        }

        let query = format!(
            "CREATE type::record('hierarchy_node', $id) SET {}",
            sets.join(", ")
        );

        let mut builder = self
            .db
            .query(&query)
            .bind(("id", id_str.clone()))
            .bind(("name", input.name));

        if let Some(parent_id) = input.parent_id {
            builder = builder.bind(("parent_id", parent_id.to_string()));
        }

        let result = builder.await.map_err(DbError::from)?;
        let mut result = result.check().map_err(|e| DbError::Query(e.to_string()))?;

        let rows: Vec<HierarchyNodeRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "hierarchy_node".into(),
            id: id_str,
        })?;

        Ok(row.try_into_node(id)?)
    }

    async fn get_by_id(&self, id: Uuid) -> GrantaResult<Option<HierarchyNode>> {
        let mut result = self
            .db
            .query("SELECT * FROM type::record('hierarchy_node', $id)")
            .bind(("id", id.to_string()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<HierarchyNodeRow> = result.take(0).map_err(DbError::from)?;

        match rows.into_iter().next() {
            Some(row) => Ok(Some(row.try_into_node(id)?)),
            None => Ok(None),
        }
    }

    async fn update(
        &self,
        id: Uuid,
        input: UpdateHierarchyNode,
    ) -> GrantaResult<Option<HierarchyNode>> {
        let id_str = id.to_string();

        let mut sets = Vec::new();
        if input.name.is_some() {
            sets.push("name = $name");
        }
        match input.parent_id {
            Some(Some(_)) => sets.push("parent_id = $parent_id"),
            Some(None) => sets.push("parent_id = NONE"),
            None => {}
        }
        sets.push("updated_at = time::now()");

        let query = format!(
            "UPDATE type::record('hierarchy_node', $id) SET {}",
            sets.join(", ")
        );

        let mut builder = self.db.query(&query).bind(("id", id_str));

        if let Some(name) = input.name {
            builder = builder.bind(("name", name));
        }
        if let Some(Some(parent_id)) = input.parent_id {
            builder = builder.bind(("parent_id", parent_id.to_string()));
        }

        let result = builder.await.map_err(DbError::from)?;
        let mut result = result.check().map_err(|e| DbError::Query(e.to_string()))?;

        let rows: Vec<HierarchyNodeRow> = result.take(0).map_err(DbError::from)?;

        match rows.into_iter().next() {
            Some(row) => Ok(Some(row.try_into_node(id)?)),
            None => Ok(None),
        }
    }

    async fn delete(&self, id: Uuid) -> GrantaResult<bool> {
        let id_str = id.to_string();

        // Restrict: child nodes and attached users block deletion.
        let child_count = self
            .count_where(
                "SELECT count() AS total FROM hierarchy_node \
                 WHERE parent_id = $id GROUP ALL",
                id_str.clone(),
            )
            .await?;
        if child_count > 0 {
            return Err(GrantaError::Validation {
                message: format!("hierarchy node {id} still has {child_count} child node(s)"),
            });
        }

        let user_count = self
            .count_where(
                "SELECT count() AS total FROM user \
                 WHERE hierarchy_node_id = $id GROUP ALL",
                id_str.clone(),
            )
            .await?;
        if user_count > 0 {
            return Err(GrantaError::Validation {
                message: format!("hierarchy node {id} still has {user_count} attached user(s)"),
            });
        }

        // Cascade node-targeted grants and node-originated
        // notifications, then delete the node itself.
        let mut result = self
            .db
            .query(
                "DELETE notification WHERE origin_node_id = $id; \
                 DELETE permission_grant WHERE target_kind = 'Node' \
                 AND target_id = $id; \
                 DELETE type::record('hierarchy_node', $id) RETURN BEFORE;",
            )
            .bind(("id", id_str))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<HierarchyNodeRow> = result.take(2).map_err(DbError::from)?;
        Ok(!rows.is_empty())
    }

    async fn list(&self) -> GrantaResult<Vec<HierarchyNode>> {
        let mut result = self
            .db
            .query(
                "SELECT meta::id(id) AS record_id, * FROM hierarchy_node \
                 ORDER BY created_at ASC",
            )
            .await
            .map_err(DbError::from)?;

        let rows: Vec<HierarchyNodeRowWithId> = result.take(0).map_err(DbError::from)?;

        let nodes = rows
            .into_iter()
            .map(|row| row.try_into_node())
            .collect::<Result<Vec<_>, DbError>>()?;

        Ok(nodes)
    }

    async fn children(&self, parent_id: Uuid) -> GrantaResult<Vec<HierarchyNode>> {
        let mut result = self
            .db
            .query(
                "SELECT meta::id(id) AS record_id, * FROM hierarchy_node \
                 WHERE parent_id = $parent_id \
                 ORDER BY created_at ASC",
            )
            .bind(("parent_id", parent_id.to_string()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<HierarchyNodeRowWithId> = result.take(0).map_err(DbError::from)?;

        let nodes = rows
            .into_iter()
            .map(|row| row.try_into_node())
            .collect::<Result<Vec<_>, DbError>>()?;

        Ok(nodes)
    }
}
