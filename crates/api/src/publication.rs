//! Payment-to-publication glue and moderation-rejection compensation.
//!
//! `publish_after_payment` releases a paid draft into the moderation
//! pipeline exactly once per payment; `handle_moderation_rejection`
//! reverses what a rejected post consumed (money or the weekly free
//! allowance). Both paths are driven by explicit calls, never by
//! persistence hooks.

use chrono::{Duration, Utc};
use gigboard_core::free_week::week_start_of;
use gigboard_core::pricing::AddonSelection;
use gigboard_core::types::{DbId, ExternalId, Timestamp};
use gigboard_db::models::post::{Post, PostAddons};
use gigboard_db::models::site_config::SiteConfig;
use gigboard_db::repositories::{FreePostRepo, PackageRepo, PaymentRepo, PostRepo};
use gigboard_db::DbPool;

use crate::config_cache::ConfigCache;
use crate::moderation::ModerationQueue;

/// Reason recorded on refunds issued for rejected posts.
const REFUND_REASON_MODERATION: &str = "failed moderation";

/// Release a draft into the moderation pipeline after its payment
/// confirmed.
///
/// Looks up a `pending` payment matching `(payment_id, user_external_id)`.
/// Returns `false` without side effects when the payment is missing,
/// already resolved (duplicate gateway delivery), or has no linked draft
/// post. On a match: applies the paid package and addons to the post,
/// marks the payment paid, and enqueues exactly one moderation
/// evaluation.
pub async fn publish_after_payment(
    pool: &DbPool,
    site_config: &ConfigCache,
    queue: &ModerationQueue,
    user_external_id: ExternalId,
    payment_id: DbId,
    telegram_charge_id: Option<&str>,
    provider_charge_id: Option<&str>,
) -> Result<bool, sqlx::Error> {
    let Some(payment) =
        PaymentRepo::find_for_external_user(pool, payment_id, user_external_id).await?
    else {
        tracing::warn!(payment_id, user_external_id, "Payment not found for user");
        return Ok(false);
    };

    if payment.status != "pending" {
        tracing::warn!(
            payment_id,
            status = %payment.status,
            "Payment already resolved, ignoring duplicate confirmation"
        );
        return Ok(false);
    }

    let Some(post_id) = payment.post_id else {
        tracing::warn!(payment_id, "Payment has no linked draft post");
        return Ok(false);
    };

    let Some(post) = PostRepo::find_by_id(pool, post_id).await? else {
        tracing::warn!(payment_id, post_id, "Linked draft post is missing or deleted");
        return Ok(false);
    };

    let config = site_config.get().await?;
    let addons = addon_columns(&post, payment.addons(), &config, Utc::now());
    PostRepo::apply_package(pool, post.id, payment.package_id, &addons).await?;

    // The status guard makes this the idempotency point: a concurrent
    // duplicate confirmation loses here and reports false.
    let marked = PaymentRepo::mark_paid(pool, payment.id, telegram_charge_id, provider_charge_id)
        .await?;
    if !marked {
        tracing::warn!(payment_id, "Payment resolved concurrently, skipping release");
        return Ok(false);
    }

    tracing::info!(
        payment_id,
        post_id,
        order_id = %payment.order_id,
        "Payment confirmed, post released into moderation"
    );
    queue.enqueue(post.id).await;
    Ok(true)
}

/// Compensate for a post the moderation pipeline rejected.
///
/// Paid package: refund the most recent matching `paid` payment for that
/// user and package. Free package: delete the user's free-post record
/// for the current week, restoring the allowance. Moderation failure
/// must not silently consume a user's payment or free allowance.
pub async fn handle_moderation_rejection(pool: &DbPool, post: &Post) -> Result<(), sqlx::Error> {
    let Some(package_id) = post.package_id else {
        return Ok(());
    };
    let Some(package) = PackageRepo::find_by_id(pool, package_id).await? else {
        tracing::warn!(post_id = post.id, package_id, "Rejected post references unknown package");
        return Ok(());
    };

    if package.is_paid() {
        let payment =
            PaymentRepo::latest_paid_for_user_package(pool, post.user_id, package_id).await?;
        match payment {
            Some(payment) => {
                let refunded =
                    PaymentRepo::refund(pool, payment.id, REFUND_REASON_MODERATION).await?;
                if refunded {
                    tracing::info!(
                        post_id = post.id,
                        payment_id = payment.id,
                        order_id = %payment.order_id,
                        "Refund recorded for rejected post"
                    );
                } else {
                    tracing::warn!(
                        post_id = post.id,
                        payment_id = payment.id,
                        "Payment resolved concurrently, refund skipped"
                    );
                }
            }
            None => {
                tracing::warn!(
                    post_id = post.id,
                    package_id,
                    "No paid payment found to refund for rejected post"
                );
            }
        }
        return Ok(());
    }

    // Free tier: give the weekly allowance back, but only when this post
    // is the one that consumed it.
    let week = week_start_of(Utc::now());
    if let Some(record) = FreePostRepo::find_for_week(pool, post.user_id, week).await? {
        if record.post_id == Some(post.id) {
            FreePostRepo::release(pool, post.user_id, week).await?;
            tracing::info!(
                post_id = post.id,
                user_id = post.user_id,
                "Free-tier allowance restored after rejection"
            );
        }
    }
    Ok(())
}

/// Compute the addon columns a post receives when a payment's addon
/// selection is applied.
///
/// Highlight gets a fresh window and makes the card premium. Photo
/// extends an active window up to the configured duration rather than
/// stacking; an expired or absent window starts fresh.
pub fn addon_columns(
    post: &Post,
    selection: AddonSelection,
    config: &SiteConfig,
    now: Timestamp,
) -> PostAddons {
    let highlight_expires_at = selection
        .highlight
        .then(|| now + Duration::days(config.highlight_addon_duration_days as i64));

    let photo_expires_at = if selection.photo {
        let days = config.photo_addon_duration_days as i64;
        let target = now + Duration::days(days);
        match post.photo_expires_at {
            Some(current) if current > now => {
                let remaining = (current - now).num_days();
                if remaining < days {
                    Some(target)
                } else {
                    Some(current)
                }
            }
            _ => Some(target),
        }
    } else {
        None
    };

    PostAddons {
        has_photo_addon: selection.photo,
        has_highlight_addon: selection.highlight,
        photo_expires_at,
        highlight_expires_at,
        is_premium: selection.highlight,
    }
}
