//! Repository for the `users` table.

use gigboard_core::types::{DbId, ExternalId};
use sqlx::PgPool;

use crate::models::user::User;

/// Column list for users queries.
const USER_COLUMNS: &str = "id, external_id, username, created_at";

/// Lookup and create-on-first-contact operations for chat users.
pub struct UserRepo;

impl UserRepo {
    /// Find a user by their chat-platform id.
    pub async fn find_by_external_id(
        pool: &PgPool,
        external_id: ExternalId,
    ) -> Result<Option<User>, sqlx::Error> {
        let query = format!("SELECT {USER_COLUMNS} FROM users WHERE external_id = $1");
        sqlx::query_as::<_, User>(&query)
            .bind(external_id)
            .fetch_optional(pool)
            .await
    }

    /// Find a user by primary key.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<User>, sqlx::Error> {
        let query = format!("SELECT {USER_COLUMNS} FROM users WHERE id = $1");
        sqlx::query_as::<_, User>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Get or create the user for a chat-platform id, refreshing the
    /// username when the platform supplies one.
    pub async fn find_or_create(
        pool: &PgPool,
        external_id: ExternalId,
        username: Option<&str>,
    ) -> Result<User, sqlx::Error> {
        let query = format!(
            "INSERT INTO users (external_id, username)
             VALUES ($1, $2)
             ON CONFLICT ON CONSTRAINT uq_users_external_id
             DO UPDATE SET username = COALESCE(EXCLUDED.username, users.username)
             RETURNING {USER_COLUMNS}"
        );
        sqlx::query_as::<_, User>(&query)
            .bind(external_id)
            .bind(username)
            .fetch_one(pool)
            .await
    }
}
