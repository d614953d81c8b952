//! Daily stats collection: per-date counters for new users and posts.
//!
//! Covers both yesterday (final numbers) and today (running numbers) on
//! each run; the upsert recomputes, so re-runs are harmless.

use std::time::Duration;

use chrono::{Duration as ChronoDuration, Utc};
use gigboard_db::models::daily_stats::DailyStats;
use gigboard_db::repositories::StatsRepo;
use gigboard_db::DbPool;
use serde::Serialize;
use tokio_util::sync::CancellationToken;

/// How often stats are collected.
const COLLECT_INTERVAL: Duration = Duration::from_secs(86_400); // daily

/// Result of one collection run.
#[derive(Debug, Serialize)]
pub struct StatsOutcome {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub yesterday: Option<DailyStats>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub today: Option<DailyStats>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Collect counters for yesterday and today.
pub async fn collect_daily_stats(pool: &DbPool) -> StatsOutcome {
    let today = Utc::now().date_naive();
    let yesterday = today - ChronoDuration::days(1);

    let collected_yesterday = StatsRepo::collect_for_date(pool, yesterday).await;
    let collected_today = StatsRepo::collect_for_date(pool, today).await;

    match (collected_yesterday, collected_today) {
        (Ok(y), Ok(t)) => {
            tracing::info!(
                yesterday_posts = y.new_posts,
                today_posts = t.new_posts,
                "Daily stats collected"
            );
            StatsOutcome {
                success: true,
                yesterday: Some(y),
                today: Some(t),
                error: None,
            }
        }
        (y, t) => {
            let error = y.err().or(t.err()).map(|e| e.to_string());
            tracing::error!(error = ?error, "Daily stats collection failed");
            StatsOutcome {
                success: false,
                yesterday: None,
                today: None,
                error,
            }
        }
    }
}

/// Run the collection loop until `cancel` is triggered.
pub async fn run(pool: DbPool, cancel: CancellationToken) {
    tracing::info!(
        interval_secs = COLLECT_INTERVAL.as_secs(),
        "Daily stats job started"
    );

    let mut interval = tokio::time::interval(COLLECT_INTERVAL);
    interval.tick().await;

    loop {
        tokio::select! {
            _ = cancel.cancelled() => {
                tracing::info!("Daily stats job stopping");
                break;
            }
            _ = interval.tick() => {
                collect_daily_stats(&pool).await;
            }
        }
    }
}
