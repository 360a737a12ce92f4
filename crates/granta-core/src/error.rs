//! Error types for the GRANTA system.

use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum GrantaError {
    #[error("Entity not found: {entity} with id {id}")]
    NotFound { entity: String, id: String },

    #[error("Entity already exists: {entity}")]
    AlreadyExists { entity: String },

    #[error("Validation error: {message}")]
    Validation { message: String },

    #[error("Hierarchy cycle detected at node {node_id}")]
    HierarchyCycle { node_id: Uuid },

    #[error("Database error: {0}")]
    Database(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

pub type GrantaResult<T> = Result<T, GrantaError>;
