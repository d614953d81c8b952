//! Per-date platform counters.

use chrono::NaiveDate;
use gigboard_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

/// A row from the `daily_stats` table, unique per `stat_date`.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct DailyStats {
    pub id: DbId,
    pub stat_date: NaiveDate,
    pub new_users: i64,
    pub new_posts: i64,
    pub post_views: i64,
    pub favorites_added: i64,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}
