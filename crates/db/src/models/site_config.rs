//! Runtime site configuration singleton.

use gigboard_core::moderation::ModerationFlags;
use gigboard_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// The single row of the `site_config` table (`id = 1`).
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct SiteConfig {
    pub id: DbId,
    pub site_name: String,
    pub auto_moderation_enabled: bool,
    pub manual_approval_required: bool,
    pub post_expiry_days: i32,
    pub admin_chat_id: String,
    pub notification_bot_token: String,
    pub payment_provider_token: String,
    pub classifier_api_key: String,
    pub photo_addon_duration_days: i32,
    pub highlight_addon_duration_days: i32,
    pub auto_bump_addon_duration_days: i32,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl SiteConfig {
    pub fn moderation_flags(&self) -> ModerationFlags {
        ModerationFlags {
            auto_moderation_enabled: self.auto_moderation_enabled,
            manual_approval_required: self.manual_approval_required,
        }
    }
}

/// DTO for partial configuration updates through the admin surface.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateSiteConfig {
    pub site_name: Option<String>,
    pub auto_moderation_enabled: Option<bool>,
    pub manual_approval_required: Option<bool>,
    pub post_expiry_days: Option<i32>,
    pub admin_chat_id: Option<String>,
    pub notification_bot_token: Option<String>,
    pub payment_provider_token: Option<String>,
    pub classifier_api_key: Option<String>,
    pub photo_addon_duration_days: Option<i32>,
    pub highlight_addon_duration_days: Option<i32>,
    pub auto_bump_addon_duration_days: Option<i32>,
}
