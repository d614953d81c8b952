pub mod health;

use axum::routing::{get, post};
use axum::Router;

use crate::handlers;
use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /posts                               submit (POST), published listing (GET)
/// /posts/{id}                          detail (GET), owner edit (PUT), soft delete (DELETE)
/// /posts/{id}/archive                  owner archive (POST)
/// /posts/{id}/resubmit                 owner resubmission, Archived -> Draft (POST)
///
/// /moderation/queue                    posts awaiting admin decision (GET)
/// /moderation/{id}/approve             admin approve (POST)
/// /moderation/{id}/reject              admin reject + compensation (POST)
///
/// /payments                            create pending payment + invoice (POST)
/// /payments/telegram/webhook           gateway pre-checkout and confirmation (POST)
///
/// /config                              read (GET), write-through update (PUT)
/// /admin/archive-expired               manual expiry sweep (POST)
/// /admin/collect-stats                 manual stats collection (POST)
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/posts",
            post(handlers::posts::submit_post).get(handlers::posts::list_posts),
        )
        .route(
            "/posts/{id}",
            get(handlers::posts::get_post)
                .put(handlers::posts::update_post)
                .delete(handlers::posts::delete_post),
        )
        .route("/posts/{id}/archive", post(handlers::posts::archive_post))
        .route("/posts/{id}/resubmit", post(handlers::posts::resubmit_post))
        .route("/moderation/queue", get(handlers::moderation::review_queue))
        .route(
            "/moderation/{id}/approve",
            post(handlers::moderation::approve_post),
        )
        .route(
            "/moderation/{id}/reject",
            post(handlers::moderation::reject_post),
        )
        .route("/payments", post(handlers::payments::create_payment))
        .route(
            "/payments/telegram/webhook",
            post(handlers::payments::telegram_webhook),
        )
        .route(
            "/config",
            get(handlers::config::get_config).put(handlers::config::update_config),
        )
        .route("/admin/archive-expired", post(handlers::config::run_archive))
        .route("/admin/collect-stats", post(handlers::config::run_stats))
}
