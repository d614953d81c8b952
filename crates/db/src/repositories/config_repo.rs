//! Repository for the `site_config` singleton.

use gigboard_core::error::CoreError;
use sqlx::PgPool;

use crate::models::site_config::{SiteConfig, UpdateSiteConfig};

/// Column list for site_config queries.
const CONFIG_COLUMNS: &str = "id, site_name, auto_moderation_enabled, \
    manual_approval_required, post_expiry_days, admin_chat_id, \
    notification_bot_token, payment_provider_token, classifier_api_key, \
    photo_addon_duration_days, highlight_addon_duration_days, \
    auto_bump_addon_duration_days, created_at, updated_at";

/// The singleton row id. The table carries a CHECK constraint pinning it.
const SINGLETON_ID: i64 = 1;

/// Error type for configuration writes.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error(transparent)]
    Core(#[from] CoreError),
    #[error(transparent)]
    Database(#[from] sqlx::Error),
}

pub struct ConfigRepo;

impl ConfigRepo {
    /// The current configuration, creating the default row when absent.
    ///
    /// The insert races benignly: `ON CONFLICT DO NOTHING` plus the
    /// re-read means concurrent first readers all see the same row.
    pub async fn current(pool: &PgPool) -> Result<SiteConfig, sqlx::Error> {
        if let Some(config) = Self::get(pool).await? {
            return Ok(config);
        }

        sqlx::query("INSERT INTO site_config (id) VALUES ($1) ON CONFLICT (id) DO NOTHING")
            .bind(SINGLETON_ID)
            .execute(pool)
            .await?;

        let query = format!("SELECT {CONFIG_COLUMNS} FROM site_config WHERE id = $1");
        sqlx::query_as::<_, SiteConfig>(&query)
            .bind(SINGLETON_ID)
            .fetch_one(pool)
            .await
    }

    /// The configuration row, without creating one.
    pub async fn get(pool: &PgPool) -> Result<Option<SiteConfig>, sqlx::Error> {
        let query = format!("SELECT {CONFIG_COLUMNS} FROM site_config WHERE id = $1");
        sqlx::query_as::<_, SiteConfig>(&query)
            .bind(SINGLETON_ID)
            .fetch_optional(pool)
            .await
    }

    /// Create the configuration row explicitly.
    ///
    /// Fails with [`CoreError::ConfigConflict`] when a row already exists;
    /// the singleton is never silently replaced.
    pub async fn create_default(pool: &PgPool) -> Result<SiteConfig, ConfigError> {
        if Self::get(pool).await?.is_some() {
            return Err(CoreError::ConfigConflict.into());
        }

        let query = format!(
            "INSERT INTO site_config (id) VALUES ($1) RETURNING {CONFIG_COLUMNS}"
        );
        sqlx::query_as::<_, SiteConfig>(&query)
            .bind(SINGLETON_ID)
            .fetch_one(pool)
            .await
            .map_err(|e| match &e {
                sqlx::Error::Database(db_err) if db_err.code().as_deref() == Some("23505") => {
                    CoreError::ConfigConflict.into()
                }
                _ => ConfigError::Database(e),
            })
    }

    /// Apply a partial update to the singleton row.
    ///
    /// Callers holding a config cache must invalidate it after this
    /// returns; see `gigboard-api`'s `ConfigCache`.
    pub async fn update(
        pool: &PgPool,
        input: &UpdateSiteConfig,
    ) -> Result<SiteConfig, sqlx::Error> {
        // Make sure the row exists before updating it.
        Self::current(pool).await?;

        let query = format!(
            "UPDATE site_config
             SET site_name = COALESCE($2, site_name),
                 auto_moderation_enabled = COALESCE($3, auto_moderation_enabled),
                 manual_approval_required = COALESCE($4, manual_approval_required),
                 post_expiry_days = COALESCE($5, post_expiry_days),
                 admin_chat_id = COALESCE($6, admin_chat_id),
                 notification_bot_token = COALESCE($7, notification_bot_token),
                 payment_provider_token = COALESCE($8, payment_provider_token),
                 classifier_api_key = COALESCE($9, classifier_api_key),
                 photo_addon_duration_days = COALESCE($10, photo_addon_duration_days),
                 highlight_addon_duration_days = COALESCE($11, highlight_addon_duration_days),
                 auto_bump_addon_duration_days = COALESCE($12, auto_bump_addon_duration_days),
                 updated_at = now()
             WHERE id = $1
             RETURNING {CONFIG_COLUMNS}"
        );
        sqlx::query_as::<_, SiteConfig>(&query)
            .bind(SINGLETON_ID)
            .bind(&input.site_name)
            .bind(input.auto_moderation_enabled)
            .bind(input.manual_approval_required)
            .bind(input.post_expiry_days)
            .bind(&input.admin_chat_id)
            .bind(&input.notification_bot_token)
            .bind(&input.payment_provider_token)
            .bind(&input.classifier_api_key)
            .bind(input.photo_addon_duration_days)
            .bind(input.highlight_addon_duration_days)
            .bind(input.auto_bump_addon_duration_days)
            .fetch_one(pool)
            .await
    }
}
