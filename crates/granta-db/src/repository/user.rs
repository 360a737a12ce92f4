//! SurrealDB implementation of [`UserRepository`].

use chrono::{DateTime, Utc};
use granta_core::error::GrantaResult;
use granta_core::models::user::{CreateUser, UpdateUser, User};
use granta_core::repository::UserRepository;
use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;
use uuid::Uuid;

use crate::error::DbError;

/// DB-side row struct for queries where the UUID is already known.
#[derive(Debug, SurrealValue)]
struct UserRow {
    username: String,
    display_name: String,
    hierarchy_node_id: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

/// DB-side row struct that includes the record ID via `meta::id(id)`.
#[derive(Debug, SurrealValue)]
struct UserRowWithId {
    record_id: String,
    username: String,
    display_name: String,
    hierarchy_node_id: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

fn parse_node(hierarchy_node_id: Option<String>) -> Result<Option<Uuid>, DbError> {
    hierarchy_node_id
        .map(|n| {
            Uuid::parse_str(&n).map_err(|e| DbError::Decode(format!("invalid node UUID: {e}")))
        })
        .transpose()
}

impl UserRow {
    fn try_into_user(self, id: Uuid) -> Result<User, DbError> {
        Ok(User {
            id,
            username: self.username,
            display_name: self.display_name,
            hierarchy_node_id: parse_node(self.hierarchy_node_id)?,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

impl UserRowWithId {
    fn try_into_user(self) -> Result<User, DbError> {
        let id = Uuid::parse_str(&self.record_id)
            .map_err(|e| DbError::Decode(format!("invalid UUID: {e}")))?;
        Ok(User {
            id,
            username: self.username,
            display_name: self.display_name,
            hierarchy_node_id: parse_node(self.hierarchy_node_id)?,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

/// SurrealDB implementation of the user repository.
#[derive(Clone)]
pub struct SurrealUserRepository<C: Connection> {
    db: Surreal<C>,
}

impl<C: Connection> SurrealUserRepository<C> {
    pub fn new(db: Surreal<C>) -> Self {
        Self { db }
    }
}

impl<C: Connection> UserRepository for SurrealUserRepository<C> {
    async fn create(&self, input: CreateUser) -> GrantaResult<User> {
        let id = Uuid::new_v4();
        let id_str = id.to_string();

        let mut sets = vec!["username = $username", "display_name = $display_name"];
        if input.hierarchy_node_id.is_some() {
            sets.push("hierarchy_node_id = $hierarchy_node_id");
        }

        let query = format!("CREATE type::record('user', $id) SET {}", sets.join(", "));

        let mut builder = self
            .db
            .query(&query)
            .bind(("id", id_str.clone()))
            .bind(("username", input.username))
            .bind(("display_name", input.display_name));

        if let Some(node_id) = input.hierarchy_node_id {
            builder = builder.bind(("hierarchy_node_id", node_id.to_string()));
        }

        let result = builder.await.map_err(DbError::from)?;
        let mut result = result.check().map_err(|e| DbError::from_check("user", e))?;

        let rows: Vec<UserRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "user".into(),
            id: id_str,
        })?;

        Ok(row.try_into_user(id)?)
    }

    async fn get_by_id(&self, id: Uuid) -> GrantaResult<Option<User>> {
        let mut result = self
            .db
            .query("SELECT * FROM type::record('user', $id)")
            .bind(("id", id.to_string()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<UserRow> = result.take(0).map_err(DbError::from)?;

        match rows.into_iter().next() {
            Some(row) => Ok(Some(row.try_into_user(id)?)),
            None => Ok(None),
        }
    }

    async fn update(&self, id: Uuid, input: UpdateUser) -> GrantaResult<Option<User>> {
        let id_str = id.to_string();

        let mut sets = Vec::new();
        if input.username.is_some() {
            sets.push("username = $username");
        }
        if input.display_name.is_some() {
            sets.push("display_name = $display_name");
        }
        match input.hierarchy_node_id {
            Some(Some(_)) => sets.push("hierarchy_node_id = $hierarchy_node_id"),
            Some(None) => sets.push("hierarchy_node_id = NONE"),
            None => {}
        }
        sets.push("updated_at = time::now()");

        let query = format!(
            "UPDATE type::record('user', $id) SET {}",
            sets.join(", ")
        );

        let mut builder = self.db.query(&query).bind(("id", id_str));

        if let Some(username) = input.username {
            builder = builder.bind(("username", username));
        }
        if let Some(display_name) = input.display_name {
            builder = builder.bind(("display_name", display_name));
        }
        if let Some(Some(node_id)) = input.hierarchy_node_id {
            builder = builder.bind(("hierarchy_node_id", node_id.to_string()));
        }

        let result = builder.await.map_err(DbError::from)?;
        let mut result = result.check().map_err(|e| DbError::from_check("user", e))?;

        let rows: Vec<UserRow> = result.take(0).map_err(DbError::from)?;

        match rows.into_iter().next() {
            Some(row) => Ok(Some(row.try_into_user(id)?)),
            None => Ok(None),
        }
    }

    async fn delete(&self, id: Uuid) -> GrantaResult<bool> {
        // Cascade the user's grants and notifications, then delete the
        // user record.
        let mut result = self
            .db
            .query(
                "DELETE notification WHERE user_id = $id; \
                 DELETE permission_grant WHERE target_kind = 'User' \
                 AND target_id = $id; \
                 DELETE type::record('user', $id) RETURN BEFORE;",
            )
            .bind(("id", id.to_string()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<UserRow> = result.take(2).map_err(DbError::from)?;
        Ok(!rows.is_empty())
    }

    async fn list(&self) -> GrantaResult<Vec<User>> {
        let mut result = self
            .db
            .query(
                "SELECT meta::id(id) AS record_id, * FROM user \
                 ORDER BY created_at ASC",
            )
            .await
            .map_err(DbError::from)?;

        let rows: Vec<UserRowWithId> = result.take(0).map_err(DbError::from)?;

        let users = rows
            .into_iter()
            .map(|row| row.try_into_user())
            .collect::<Result<Vec<_>, DbError>>()?;

        Ok(users)
    }

    async fn list_by_node(&self, node_id: Uuid) -> GrantaResult<Vec<User>> {
        let mut result = self
            .db
            .query(
                "SELECT meta::id(id) AS record_id, * FROM user \
                 WHERE hierarchy_node_id = $node_id \
                 ORDER BY created_at ASC",
            )
            .bind(("node_id", node_id.to_string()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<UserRowWithId> = result.take(0).map_err(DbError::from)?;

        let users = rows
            .into_iter()
            .map(|row| row.try_into_user())
            .collect::<Result<Vec<_>, DbError>>()?;

        Ok(users)
    }
}
