//! Integration tests for the site configuration singleton.

use assert_matches::assert_matches;
use gigboard_core::error::CoreError;
use gigboard_db::models::site_config::UpdateSiteConfig;
use gigboard_db::repositories::{ConfigError, ConfigRepo};
use sqlx::PgPool;

#[sqlx::test(migrations = "./migrations")]
async fn test_current_creates_the_default_row(pool: PgPool) {
    assert!(ConfigRepo::get(&pool).await.unwrap().is_none());

    let config = ConfigRepo::current(&pool).await.unwrap();
    assert_eq!(config.id, 1);
    assert!(config.auto_moderation_enabled);
    assert!(!config.manual_approval_required);
    assert_eq!(config.post_expiry_days, 30);

    // Subsequent reads return the same row.
    let again = ConfigRepo::current(&pool).await.unwrap();
    assert_eq!(again.id, config.id);
    assert_eq!(again.created_at, config.created_at);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_second_create_conflicts(pool: PgPool) {
    ConfigRepo::create_default(&pool).await.unwrap();

    let result = ConfigRepo::create_default(&pool).await;
    assert_matches!(result, Err(ConfigError::Core(CoreError::ConfigConflict)));
}

#[sqlx::test(migrations = "./migrations")]
async fn test_partial_update_leaves_other_fields(pool: PgPool) {
    let before = ConfigRepo::current(&pool).await.unwrap();

    let input = UpdateSiteConfig {
        manual_approval_required: Some(true),
        post_expiry_days: Some(14),
        ..Default::default()
    };
    let after = ConfigRepo::update(&pool, &input).await.unwrap();

    assert!(after.manual_approval_required);
    assert_eq!(after.post_expiry_days, 14);
    // Untouched fields keep their values.
    assert_eq!(after.auto_moderation_enabled, before.auto_moderation_enabled);
    assert_eq!(after.site_name, before.site_name);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_update_creates_the_row_when_absent(pool: PgPool) {
    let input = UpdateSiteConfig {
        admin_chat_id: Some("-100200300".to_string()),
        ..Default::default()
    };
    let config = ConfigRepo::update(&pool, &input).await.unwrap();
    assert_eq!(config.admin_chat_id, "-100200300");
}
