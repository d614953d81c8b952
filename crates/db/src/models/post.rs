//! Post entity rows and DTOs.

use gigboard_core::status::PostStatus;
use gigboard_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// `posts.kind` value for job listings.
pub const KIND_JOB: &str = "job";

/// `posts.kind` value for service listings.
pub const KIND_SERVICE: &str = "service";

/// A row from the `posts` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Post {
    pub id: DbId,
    pub kind: String,
    pub title: String,
    pub description: String,
    pub price: i32,
    pub currency: String,
    pub city_id: DbId,
    pub rubric_id: DbId,
    pub user_id: DbId,
    pub user_phone: Option<String>,
    pub address: Option<String>,
    pub status: i16,
    pub is_premium: bool,
    pub package_id: Option<DbId>,
    pub has_photo_addon: bool,
    pub has_highlight_addon: bool,
    pub photo_expires_at: Option<Timestamp>,
    pub highlight_expires_at: Option<Timestamp>,
    pub is_deleted: bool,
    pub deleted_at: Option<Timestamp>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Post {
    /// Decode the raw status column. Unknown values map to `None`, which
    /// only happens if the column was written outside the repository.
    pub fn current_status(&self) -> Option<PostStatus> {
        PostStatus::from_id(self.status)
    }
}

/// DTO for inserting a new draft post.
#[derive(Debug, Clone, Deserialize)]
pub struct CreatePost {
    pub kind: String,
    pub title: String,
    pub description: String,
    pub price: i32,
    pub currency: String,
    pub city_id: DbId,
    pub rubric_id: DbId,
    pub user_id: DbId,
    pub user_phone: Option<String>,
    pub address: Option<String>,
    pub package_id: Option<DbId>,
}

/// DTO for an owner edit. Every edit resets the post to Draft.
#[derive(Debug, Clone, Deserialize)]
pub struct UpdatePost {
    pub title: Option<String>,
    pub description: Option<String>,
    pub price: Option<i32>,
    pub user_phone: Option<String>,
    pub address: Option<String>,
}

/// Addon columns applied to a post on publication.
#[derive(Debug, Clone, Copy)]
pub struct PostAddons {
    pub has_photo_addon: bool,
    pub has_highlight_addon: bool,
    pub photo_expires_at: Option<Timestamp>,
    pub highlight_expires_at: Option<Timestamp>,
    /// A highlight addon makes the card premium.
    pub is_premium: bool,
}
