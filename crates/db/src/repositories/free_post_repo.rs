//! Repository for the `free_post_records` table.
//!
//! One row per (user, week) marks the weekly free-tier allowance as
//! consumed. Deleting the row gives the allowance back.

use chrono::NaiveDate;
use gigboard_core::types::DbId;
use sqlx::PgPool;

use crate::models::free_post::FreePostRecord;

/// Column list for free_post_records queries.
const RECORD_COLUMNS: &str = "id, user_id, week_start, post_id, created_at";

pub struct FreePostRepo;

impl FreePostRepo {
    /// Whether the user still holds their free publication for the week.
    pub async fn can_post_free(
        pool: &PgPool,
        user_id: DbId,
        week_start: NaiveDate,
    ) -> Result<bool, sqlx::Error> {
        let (exists,): (bool,) = sqlx::query_as(
            "SELECT EXISTS(
                 SELECT 1 FROM free_post_records
                 WHERE user_id = $1 AND week_start = $2
             )",
        )
        .bind(user_id)
        .bind(week_start)
        .fetch_one(pool)
        .await?;
        Ok(!exists)
    }

    /// Consume the allowance for the week. Returns `false` when it was
    /// already consumed (unique constraint, no row inserted).
    pub async fn consume(
        pool: &PgPool,
        user_id: DbId,
        week_start: NaiveDate,
        post_id: DbId,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "INSERT INTO free_post_records (user_id, week_start, post_id)
             VALUES ($1, $2, $3)
             ON CONFLICT ON CONSTRAINT uq_free_post_records_user_week DO NOTHING",
        )
        .bind(user_id)
        .bind(week_start)
        .bind(post_id)
        .execute(pool)
        .await?;
        Ok(result.rows_affected() == 1)
    }

    /// Give the allowance back (post rejected by moderation).
    pub async fn release(
        pool: &PgPool,
        user_id: DbId,
        week_start: NaiveDate,
    ) -> Result<bool, sqlx::Error> {
        let result =
            sqlx::query("DELETE FROM free_post_records WHERE user_id = $1 AND week_start = $2")
                .bind(user_id)
                .bind(week_start)
                .execute(pool)
                .await?;
        Ok(result.rows_affected() == 1)
    }

    /// The record consuming this week's allowance, when present.
    pub async fn find_for_week(
        pool: &PgPool,
        user_id: DbId,
        week_start: NaiveDate,
    ) -> Result<Option<FreePostRecord>, sqlx::Error> {
        let query = format!(
            "SELECT {RECORD_COLUMNS} FROM free_post_records
             WHERE user_id = $1 AND week_start = $2"
        );
        sqlx::query_as::<_, FreePostRecord>(&query)
            .bind(user_id)
            .bind(week_start)
            .fetch_optional(pool)
            .await
    }
}
