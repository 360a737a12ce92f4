//! GRANTA Core — domain models, repository contracts, and error types
//! for the permission-grant and notification fan-out system.

pub mod error;
pub mod models;
pub mod repository;
