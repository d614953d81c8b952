use crate::types::DbId;

#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Entity not found: {entity} with id {id}")]
    NotFound { entity: &'static str, id: DbId },

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    /// Only one site configuration row may ever exist.
    #[error("A site configuration row already exists")]
    ConfigConflict,

    /// A ledger operation was attempted against an unsuitable package,
    /// e.g. creating a payment for the free tier.
    #[error("Invalid package: {0}")]
    InvalidPackage(String),

    #[error("Internal error: {0}")]
    Internal(String),
}
