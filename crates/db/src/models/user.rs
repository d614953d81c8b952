//! Chat-platform user rows.

use gigboard_core::types::{DbId, ExternalId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

/// A row from the `users` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct User {
    pub id: DbId,
    pub external_id: ExternalId,
    pub username: Option<String>,
    pub created_at: Timestamp,
}
