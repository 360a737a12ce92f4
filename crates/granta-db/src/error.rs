//! Database-specific error types and conversions.

use granta_core::error::GrantaError;

/// Database-layer error type.
#[derive(Debug, thiserror::Error)]
pub enum DbError {
    #[error("SurrealDB error: {0}")]
    Surreal(#[from] surrealdb::Error),

    #[error("Migration failed: {0}")]
    Migration(String),

    #[error("Query failed: {0}")]
    Query(String),

    #[error("Row conversion failed: {0}")]
    Decode(String),

    #[error("Record not found: {entity} with id {id}")]
    NotFound { entity: String, id: String },

    #[error("Unique constraint violated for {entity}: {detail}")]
    Conflict { entity: String, detail: String },
}

impl DbError {
    /// Classifies a statement failure as a unique-index conflict when
    /// the engine's message names an index, otherwise as a plain query
    /// error.
    pub(crate) fn from_check(entity: &str, err: surrealdb::Error) -> Self {
        let detail = err.to_string();
        if detail.contains("index") {
            DbError::Conflict {
                entity: entity.into(),
                detail,
            }
        } else {
            DbError::Query(detail)
        }
    }
}

impl From<DbError> for GrantaError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::NotFound { entity, id } => GrantaError::NotFound { entity, id },
            DbError::Conflict { entity, .. } => GrantaError::AlreadyExists { entity },
            other => GrantaError::Database(other.to_string()),
        }
    }
}
