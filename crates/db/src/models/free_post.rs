//! Weekly free-tier allowance markers.

use chrono::NaiveDate;
use gigboard_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

/// A row from the `free_post_records` table. One per (user, week).
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct FreePostRecord {
    pub id: DbId,
    pub user_id: DbId,
    pub week_start: NaiveDate,
    pub post_id: Option<DbId>,
    pub created_at: Timestamp,
}
