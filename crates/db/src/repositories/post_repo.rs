//! Repository for the `posts` table.
//!
//! Status writes go through [`PostRepo::transition`], which checks the
//! edge against the status machine and performs a status-guarded UPDATE,
//! so concurrent writers cannot race a post through an illegal path.

use gigboard_core::error::CoreError;
use gigboard_core::status::{illegal_transition, PostStatus};
use gigboard_core::types::{DbId, Timestamp};
use sqlx::PgPool;

use crate::models::post::{CreatePost, Post, PostAddons, UpdatePost};

/// Column list for posts queries.
const POST_COLUMNS: &str = "id, kind, title, description, price, currency, city_id, \
    rubric_id, user_id, user_phone, address, status, is_premium, package_id, \
    has_photo_addon, has_highlight_addon, photo_expires_at, highlight_expires_at, \
    is_deleted, deleted_at, created_at, updated_at";

/// Error type for status-machine-guarded writes.
#[derive(Debug, thiserror::Error)]
pub enum TransitionError {
    #[error(transparent)]
    Core(#[from] CoreError),
    #[error(transparent)]
    Database(#[from] sqlx::Error),
}

pub struct PostRepo;

impl PostRepo {
    /// Insert a new post in Draft status.
    pub async fn create(pool: &PgPool, input: &CreatePost) -> Result<Post, sqlx::Error> {
        let query = format!(
            "INSERT INTO posts
                (kind, title, description, price, currency, city_id, rubric_id,
                 user_id, user_phone, address, package_id, status)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
             RETURNING {POST_COLUMNS}"
        );
        sqlx::query_as::<_, Post>(&query)
            .bind(&input.kind)
            .bind(&input.title)
            .bind(&input.description)
            .bind(input.price)
            .bind(&input.currency)
            .bind(input.city_id)
            .bind(input.rubric_id)
            .bind(input.user_id)
            .bind(&input.user_phone)
            .bind(&input.address)
            .bind(input.package_id)
            .bind(PostStatus::Draft.id())
            .fetch_one(pool)
            .await
    }

    /// Find a post by id, excluding soft-deleted rows.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Post>, sqlx::Error> {
        let query = format!(
            "SELECT {POST_COLUMNS} FROM posts WHERE id = $1 AND is_deleted = FALSE"
        );
        sqlx::query_as::<_, Post>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Move a post along one edge of the status machine.
    ///
    /// The UPDATE is guarded by the expected `from` status; a post that
    /// has concurrently moved elsewhere (or is deleted) yields
    /// [`CoreError::Conflict`]. An edge not in the machine yields
    /// [`CoreError::Validation`] without touching the database.
    pub async fn transition(
        pool: &PgPool,
        id: DbId,
        from: PostStatus,
        to: PostStatus,
    ) -> Result<Post, TransitionError> {
        if !PostStatus::can_transition(from, to) {
            return Err(CoreError::Validation(illegal_transition(id, from, to)).into());
        }

        let query = format!(
            "UPDATE posts
             SET status = $3, updated_at = now()
             WHERE id = $1 AND status = $2 AND is_deleted = FALSE
             RETURNING {POST_COLUMNS}"
        );
        let updated = sqlx::query_as::<_, Post>(&query)
            .bind(id)
            .bind(from.id())
            .bind(to.id())
            .fetch_optional(pool)
            .await?;

        updated.ok_or_else(|| {
            CoreError::Conflict(format!("Post {id} is not in status '{from}'")).into()
        })
    }

    /// Apply an owner edit and reset the post to Draft for re-moderation.
    ///
    /// The guard mirrors [`Self::transition`]: only posts currently in
    /// one of `allowed_from` are touched.
    pub async fn update_content_to_draft(
        pool: &PgPool,
        id: DbId,
        input: &UpdatePost,
        allowed_from: &[PostStatus],
    ) -> Result<Option<Post>, sqlx::Error> {
        let from_ids: Vec<i16> = allowed_from.iter().map(|s| s.id()).collect();
        let query = format!(
            "UPDATE posts
             SET title = COALESCE($2, title),
                 description = COALESCE($3, description),
                 price = COALESCE($4, price),
                 user_phone = COALESCE($5, user_phone),
                 address = COALESCE($6, address),
                 status = $7,
                 updated_at = now()
             WHERE id = $1 AND status = ANY($8) AND is_deleted = FALSE
             RETURNING {POST_COLUMNS}"
        );
        sqlx::query_as::<_, Post>(&query)
            .bind(id)
            .bind(&input.title)
            .bind(&input.description)
            .bind(input.price)
            .bind(&input.user_phone)
            .bind(&input.address)
            .bind(PostStatus::Draft.id())
            .bind(&from_ids)
            .fetch_optional(pool)
            .await
    }

    /// Soft-delete a post. Returns `false` when already deleted or missing.
    pub async fn soft_delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE posts
             SET is_deleted = TRUE, deleted_at = now(), updated_at = now()
             WHERE id = $1 AND is_deleted = FALSE",
        )
        .bind(id)
        .execute(pool)
        .await?;
        Ok(result.rows_affected() == 1)
    }

    /// List published posts, newest first.
    pub async fn list_published(
        pool: &PgPool,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Post>, sqlx::Error> {
        let query = format!(
            "SELECT {POST_COLUMNS} FROM posts
             WHERE status = $1 AND is_deleted = FALSE
             ORDER BY created_at DESC
             LIMIT $2 OFFSET $3"
        );
        sqlx::query_as::<_, Post>(&query)
            .bind(PostStatus::Published.id())
            .bind(limit)
            .bind(offset)
            .fetch_all(pool)
            .await
    }

    /// Posts awaiting an admin decision, oldest first.
    pub async fn list_pending_review(pool: &PgPool) -> Result<Vec<Post>, sqlx::Error> {
        let query = format!(
            "SELECT {POST_COLUMNS} FROM posts
             WHERE status = $1 AND is_deleted = FALSE
             ORDER BY created_at ASC"
        );
        sqlx::query_as::<_, Post>(&query)
            .bind(PostStatus::PendingManualReview.id())
            .fetch_all(pool)
            .await
    }

    /// Set the package and addon columns applied on publication.
    pub async fn apply_package(
        pool: &PgPool,
        id: DbId,
        package_id: DbId,
        addons: &PostAddons,
    ) -> Result<Option<Post>, sqlx::Error> {
        let query = format!(
            "UPDATE posts
             SET package_id = $2,
                 has_photo_addon = $3,
                 has_highlight_addon = $4,
                 photo_expires_at = $5,
                 highlight_expires_at = $6,
                 is_premium = $7,
                 updated_at = now()
             WHERE id = $1 AND is_deleted = FALSE
             RETURNING {POST_COLUMNS}"
        );
        sqlx::query_as::<_, Post>(&query)
            .bind(id)
            .bind(package_id)
            .bind(addons.has_photo_addon)
            .bind(addons.has_highlight_addon)
            .bind(addons.photo_expires_at)
            .bind(addons.highlight_expires_at)
            .bind(addons.is_premium)
            .fetch_optional(pool)
            .await
    }

    /// Bulk-archive published posts created before `cutoff`.
    ///
    /// Already-archived rows fall out of the status filter, so the sweep
    /// is safe to run concurrently with itself.
    pub async fn archive_expired(pool: &PgPool, cutoff: Timestamp) -> Result<u64, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE posts
             SET status = $1, updated_at = now()
             WHERE status = $2 AND is_deleted = FALSE AND created_at < $3",
        )
        .bind(PostStatus::Archived.id())
        .bind(PostStatus::Published.id())
        .bind(cutoff)
        .execute(pool)
        .await?;
        Ok(result.rows_affected())
    }

    /// Drafts that have sat unevaluated past the grace window.
    ///
    /// Drafts linked to an unresolved (`pending`) payment are waiting on
    /// the gateway, not on moderation, and are excluded. Drafts linked to
    /// a `paid` payment are owed an evaluation; drafts with no payment at
    /// all came through the free path and are owed one too. Drafts whose
    /// only payments failed or were cancelled were never released into
    /// the pipeline and stay put.
    pub async fn stalled_drafts(
        pool: &PgPool,
        older_than: Timestamp,
    ) -> Result<Vec<DbId>, sqlx::Error> {
        let rows: Vec<(DbId,)> = sqlx::query_as(
            "SELECT p.id FROM posts p
             WHERE p.status = $1
               AND p.is_deleted = FALSE
               AND p.updated_at < $2
               AND (
                   NOT EXISTS (SELECT 1 FROM payments pay WHERE pay.post_id = p.id)
                   OR EXISTS (SELECT 1 FROM payments pay
                              WHERE pay.post_id = p.id AND pay.status = 'paid')
               )
               AND NOT EXISTS (SELECT 1 FROM payments pay
                               WHERE pay.post_id = p.id AND pay.status = 'pending')
             ORDER BY p.updated_at ASC",
        )
        .bind(PostStatus::Draft.id())
        .bind(older_than)
        .fetch_all(pool)
        .await?;
        Ok(rows.into_iter().map(|(id,)| id).collect())
    }

    /// New posts created on a given calendar date (stats collection).
    pub async fn count_created_on(
        pool: &PgPool,
        date: chrono::NaiveDate,
    ) -> Result<i64, sqlx::Error> {
        let (count,): (i64,) =
            sqlx::query_as("SELECT COUNT(*) FROM posts WHERE created_at::date = $1")
                .bind(date)
                .fetch_one(pool)
                .await?;
        Ok(count)
    }
}
