//! Scheduled expiry sweep: aged Published posts move to Archived.
//!
//! Runs daily against the config-defined expiry window. The bulk status
//! update is the unit of success; logging around it never fails the
//! batch. Also callable directly through the admin surface for manual
//! runs.

use std::time::Duration;

use chrono::Utc;
use gigboard_db::repositories::PostRepo;
use gigboard_db::DbPool;
use serde::Serialize;
use tokio_util::sync::CancellationToken;

use crate::config_cache::ConfigCache;

/// How often the sweep runs.
const SWEEP_INTERVAL: Duration = Duration::from_secs(86_400); // daily

/// Result of one sweep run.
#[derive(Debug, Serialize)]
pub struct ArchiveOutcome {
    pub success: bool,
    pub archived_count: u64,
    pub expiry_days: i32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Run one sweep: archive published posts older than the expiry window.
pub async fn archive_expired_posts(pool: &DbPool, site_config: &ConfigCache) -> ArchiveOutcome {
    let config = match site_config.get().await {
        Ok(config) => config,
        Err(e) => {
            tracing::error!(error = %e, "Expiry sweep could not read configuration");
            return ArchiveOutcome {
                success: false,
                archived_count: 0,
                expiry_days: 0,
                error: Some(e.to_string()),
            };
        }
    };

    let expiry_days = config.post_expiry_days;
    let cutoff = Utc::now() - chrono::Duration::days(expiry_days as i64);

    match PostRepo::archive_expired(pool, cutoff).await {
        Ok(archived_count) => {
            if archived_count > 0 {
                tracing::info!(archived_count, expiry_days, "Expiry sweep archived posts");
            } else {
                tracing::debug!(expiry_days, "Expiry sweep found nothing to archive");
            }
            ArchiveOutcome {
                success: true,
                archived_count,
                expiry_days,
                error: None,
            }
        }
        Err(e) => {
            tracing::error!(error = %e, "Expiry sweep failed");
            ArchiveOutcome {
                success: false,
                archived_count: 0,
                expiry_days,
                error: Some(e.to_string()),
            }
        }
    }
}

/// Run the sweep loop until `cancel` is triggered.
pub async fn run(pool: DbPool, site_config: ConfigCache, cancel: CancellationToken) {
    tracing::info!(
        interval_secs = SWEEP_INTERVAL.as_secs(),
        "Expiry sweep job started"
    );

    let mut interval = tokio::time::interval(SWEEP_INTERVAL);
    // Skip the immediate first tick; the daily cadence starts tomorrow.
    interval.tick().await;

    loop {
        tokio::select! {
            _ = cancel.cancelled() => {
                tracing::info!("Expiry sweep job stopping");
                break;
            }
            _ = interval.tick() => {
                archive_expired_posts(&pool, &site_config).await;
            }
        }
    }
}
