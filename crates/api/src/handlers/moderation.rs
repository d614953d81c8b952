//! Admin moderation decisions.
//!
//! Approve and reject resolve posts sitting in manual review; rejection
//! runs the compensation path so the owner's payment or free-tier
//! allowance is not silently consumed.

use axum::extract::{Path, State};
use axum::response::IntoResponse;
use axum::Json;
use gigboard_core::status::PostStatus;
use gigboard_core::types::DbId;
use gigboard_db::models::post::Post;
use gigboard_db::repositories::{PostRepo, UserRepo};

use crate::error::AppResult;
use crate::publication;
use crate::response::DataResponse;
use crate::state::AppState;

/// POST /api/v1/moderation/{post_id}/approve
pub async fn approve_post(
    State(state): State<AppState>,
    Path(post_id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let post = PostRepo::transition(
        &state.pool,
        post_id,
        PostStatus::PendingManualReview,
        PostStatus::Published,
    )
    .await?;

    tracing::info!(post_id, "Post approved by admin");
    notify_owner(&state, &post, "Your post has been approved and published.").await;

    Ok(Json(DataResponse { data: post }))
}

/// POST /api/v1/moderation/{post_id}/reject
pub async fn reject_post(
    State(state): State<AppState>,
    Path(post_id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let post = PostRepo::transition(
        &state.pool,
        post_id,
        PostStatus::PendingManualReview,
        PostStatus::Rejected,
    )
    .await?;

    tracing::info!(post_id, "Post rejected by admin");
    publication::handle_moderation_rejection(&state.pool, &post).await?;
    notify_owner(&state, &post, "Your post was rejected by moderation.").await;

    Ok(Json(DataResponse { data: post }))
}

/// GET /api/v1/moderation/queue
///
/// Posts awaiting an admin decision, oldest first.
pub async fn review_queue(State(state): State<AppState>) -> AppResult<impl IntoResponse> {
    let posts = PostRepo::list_pending_review(&state.pool).await?;
    Ok(Json(DataResponse { data: posts }))
}

async fn notify_owner(state: &AppState, post: &Post, text: &str) {
    let config = match state.site_config.get().await {
        Ok(config) => config,
        Err(e) => {
            tracing::warn!(error = %e, "Config read failed, owner notification skipped");
            return;
        }
    };
    match UserRepo::find_by_id(&state.pool, post.user_id).await {
        Ok(Some(owner)) => {
            state
                .notifier
                .send_user_message(&config, owner.external_id, text)
                .await;
        }
        Ok(None) => {
            tracing::warn!(post_id = post.id, "Post owner not found for notification");
        }
        Err(e) => {
            tracing::warn!(error = %e, post_id = post.id, "Owner lookup failed");
        }
    }
}
