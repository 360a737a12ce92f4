//! Schema definitions and migration runner for SurrealDB.
//!
//! All table definitions use SCHEMAFULL mode for data integrity.
//! UUIDs are stored as strings. The grant target enum is stored as a
//! string discriminant with an ASSERT constraint plus the target id.

use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;
use tracing::info;

use crate::error::DbError;

// -----------------------------------------------------------------------
// Migration tracking
// -----------------------------------------------------------------------

const MIGRATION_TABLE_DDL: &str = "\
DEFINE TABLE IF NOT EXISTS _migration SCHEMAFULL;
DEFINE FIELD IF NOT EXISTS version ON TABLE _migration TYPE int;
DEFINE FIELD IF NOT EXISTS name ON TABLE _migration TYPE string;
DEFINE FIELD IF NOT EXISTS applied_at ON TABLE _migration TYPE datetime \
    DEFAULT time::now();
DEFINE INDEX IF NOT EXISTS idx_migration_version ON TABLE _migration \
    COLUMNS version UNIQUE;
";

#[derive(Debug, SurrealValue)]
struct MigrationRecord {
    version: u32,
    #[allow(dead_code)]
    name: String,
}

struct Migration {
    version: u32,
    name: &'static str,
    sql: &'static str,
}

static MIGRATIONS: &[Migration] = &[Migration {
    version: 1,
    name: "initial_schema",
    sql: SCHEMA_V1,
}];

// -----------------------------------------------------------------------
// Schema v1 — initial table definitions
// -----------------------------------------------------------------------

const SCHEMA_V1: &str = "\
-- =======================================================================
-- Hierarchy nodes (organizational tree; children derived via parent_id)
-- =======================================================================
DEFINE TABLE hierarchy_node SCHEMAFULL;
DEFINE FIELD name ON TABLE hierarchy_node TYPE string;
DEFINE FIELD parent_id ON TABLE hierarchy_node TYPE option<string>;
DEFINE FIELD created_at ON TABLE hierarchy_node TYPE datetime \
    DEFAULT time::now();
DEFINE FIELD updated_at ON TABLE hierarchy_node TYPE datetime \
    DEFAULT time::now();
DEFINE INDEX idx_hierarchy_node_parent ON TABLE hierarchy_node \
    COLUMNS parent_id;

-- =======================================================================
-- Users
-- =======================================================================
DEFINE TABLE user SCHEMAFULL;
DEFINE FIELD username ON TABLE user TYPE string;
DEFINE FIELD display_name ON TABLE user TYPE string;
DEFINE FIELD hierarchy_node_id ON TABLE user TYPE option<string>;
DEFINE FIELD created_at ON TABLE user TYPE datetime \
    DEFAULT time::now();
DEFINE FIELD updated_at ON TABLE user TYPE datetime \
    DEFAULT time::now();
DEFINE INDEX idx_user_username ON TABLE user COLUMNS username UNIQUE;
DEFINE INDEX idx_user_node ON TABLE user COLUMNS hierarchy_node_id;

-- =======================================================================
-- Permissions
-- =======================================================================
DEFINE TABLE permission SCHEMAFULL;
DEFINE FIELD code ON TABLE permission TYPE string;
DEFINE FIELD description ON TABLE permission TYPE string;
DEFINE FIELD created_at ON TABLE permission TYPE datetime \
    DEFAULT time::now();
DEFINE FIELD updated_at ON TABLE permission TYPE datetime \
    DEFAULT time::now();
DEFINE INDEX idx_permission_code ON TABLE permission \
    COLUMNS code UNIQUE;

-- =======================================================================
-- Grants (one permission bound to exactly one target)
-- =======================================================================
DEFINE TABLE permission_grant SCHEMAFULL;
DEFINE FIELD permission_id ON TABLE permission_grant TYPE string;
DEFINE FIELD target_kind ON TABLE permission_grant TYPE string \
    ASSERT $value IN ['User', 'Node'];
DEFINE FIELD target_id ON TABLE permission_grant TYPE string;
DEFINE FIELD assigned_at ON TABLE permission_grant TYPE datetime \
    DEFAULT time::now();
DEFINE INDEX idx_grant_permission ON TABLE permission_grant \
    COLUMNS permission_id;
DEFINE INDEX idx_grant_target ON TABLE permission_grant \
    COLUMNS target_kind, target_id;

-- =======================================================================
-- Notifications (append-only log; only is_read is ever mutated)
-- =======================================================================
DEFINE TABLE notification SCHEMAFULL;
DEFINE FIELD user_id ON TABLE notification TYPE string;
DEFINE FIELD message ON TABLE notification TYPE string;
DEFINE FIELD origin_node_id ON TABLE notification TYPE option<string>;
DEFINE FIELD is_read ON TABLE notification TYPE bool DEFAULT false;
DEFINE FIELD created_at ON TABLE notification TYPE datetime \
    DEFAULT time::now();
DEFINE INDEX idx_notification_user ON TABLE notification \
    COLUMNS user_id, is_read;
DEFINE INDEX idx_notification_origin ON TABLE notification \
    COLUMNS origin_node_id;
";

// -----------------------------------------------------------------------
// Migration runner
// -----------------------------------------------------------------------

/// Applies any schema migrations newer than the current version.
pub async fn run_migrations<C: Connection>(db: &Surreal<C>) -> Result<(), DbError> {
    // Ensure migration tracking table exists (idempotent).
    db.query(MIGRATION_TABLE_DDL)
        .await?
        .check()
        .map_err(|e| DbError::Migration(e.to_string()))?;

    // Determine current schema version.
    let mut result = db
        .query("SELECT * FROM _migration ORDER BY version DESC LIMIT 1")
        .await?;
    let records: Vec<MigrationRecord> = result.take(0)?;
    let current_version = records.first().map(|m| m.version).unwrap_or(0);

    for migration in MIGRATIONS {
        if migration.version > current_version {
            info!(
                version = migration.version,
                name = migration.name,
                "Applying migration"
            );
            db.query(migration.sql).await?.check().map_err(|e| {
                DbError::Migration(format!(
                    "Migration v{} '{}' failed: {}",
                    migration.version, migration.name, e,
                ))
            })?;

            // Record the applied migration.
            db.query(
                "CREATE _migration SET version = $version, \
                 name = $name",
            )
            .bind(("version", migration.version))
            .bind(("name", migration.name))
            .await?
            .check()
            .map_err(|e| {
                DbError::Migration(format!(
                    "Failed to record migration v{}: {}",
                    migration.version, e,
                ))
            })?;

            info!(
                version = migration.version,
                "Migration applied successfully"
            );
        }
    }

    Ok(())
}

/// Returns the raw schema DDL for version 1.
///
/// Exposed for testing with in-memory SurrealDB instances that
/// bypass the migration runner.
pub fn schema_v1() -> &'static str {
    SCHEMA_V1
}
