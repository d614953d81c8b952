//! Repository for the `daily_stats` table.

use chrono::NaiveDate;
use sqlx::PgPool;

use crate::models::daily_stats::DailyStats;

/// Column list for daily_stats queries.
const STATS_COLUMNS: &str = "id, stat_date, new_users, new_posts, post_views, \
    favorites_added, created_at, updated_at";

pub struct StatsRepo;

impl StatsRepo {
    /// Count the day's new users and posts and upsert the row for `date`.
    ///
    /// Re-running for the same date recomputes and overwrites the
    /// counters, so the daily schedule can safely cover both "yesterday"
    /// (final numbers) and "today" (running numbers).
    pub async fn collect_for_date(
        pool: &PgPool,
        date: NaiveDate,
    ) -> Result<DailyStats, sqlx::Error> {
        let query = format!(
            "INSERT INTO daily_stats (stat_date, new_users, new_posts)
             VALUES (
                 $1,
                 (SELECT COUNT(*) FROM users WHERE created_at::date = $1),
                 (SELECT COUNT(*) FROM posts WHERE created_at::date = $1)
             )
             ON CONFLICT ON CONSTRAINT uq_daily_stats_date DO UPDATE
             SET new_users = EXCLUDED.new_users,
                 new_posts = EXCLUDED.new_posts,
                 updated_at = now()
             RETURNING {STATS_COLUMNS}"
        );
        sqlx::query_as::<_, DailyStats>(&query)
            .bind(date)
            .fetch_one(pool)
            .await
    }

    /// The stored row for a date, when one exists.
    pub async fn find_for_date(
        pool: &PgPool,
        date: NaiveDate,
    ) -> Result<Option<DailyStats>, sqlx::Error> {
        let query = format!("SELECT {STATS_COLUMNS} FROM daily_stats WHERE stat_date = $1");
        sqlx::query_as::<_, DailyStats>(&query)
            .bind(date)
            .fetch_optional(pool)
            .await
    }
}
