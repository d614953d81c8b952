#![allow(dead_code)] // not every test binary uses every helper

//! Shared harness for router-level integration tests.
//!
//! Mirrors the router construction in `main.rs` so tests exercise the
//! same middleware stack production uses. The classifier credential and
//! the notification bot token are empty in tests, which disables both
//! outbound calls: classification counts as a pass and notifications
//! are skipped, keeping the tests network-free.

use std::sync::Arc;
use std::time::Duration;

use axum::body::Body;
use axum::http::header::CONTENT_TYPE;
use axum::http::{Method, Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::Value;
use sqlx::PgPool;
use tokio_util::sync::CancellationToken;
use tower::ServiceExt;

use gigboard_api::config::ServerConfig;
use gigboard_api::config_cache::ConfigCache;
use gigboard_api::moderation::{ModerationClassifier, ModerationQueue, ModerationWorker};
use gigboard_api::notifier::Notifier;
use gigboard_api::router::build_app_router;
use gigboard_api::state::AppState;
use gigboard_core::status::PostStatus;
use gigboard_db::models::site_config::UpdateSiteConfig;
use gigboard_db::repositories::{ConfigRepo, PostRepo};

pub struct TestApp {
    pub router: Router,
    pub state: AppState,
    #[allow(dead_code)]
    cancel: CancellationToken,
}

/// Build a test `ServerConfig` with safe defaults. The classifier and
/// bot endpoints point at an unroutable address; nothing in the tests
/// should ever reach them.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:5173".to_string()],
        request_timeout_secs: 30,
        classifier_url: "http://127.0.0.1:9/classifier".to_string(),
        classifier_timeout_secs: 1,
        bot_api_base: "http://127.0.0.1:9".to_string(),
    }
}

/// Build the application with a live moderation worker on the given pool.
pub async fn spawn_app(pool: PgPool) -> TestApp {
    let config = test_config();
    let site_config = ConfigCache::new(pool.clone());

    let classifier = Arc::new(ModerationClassifier::new(
        config.classifier_url.clone(),
        config.classifier_timeout(),
    ));
    let notifier = Arc::new(Notifier::new(config.bot_api_base.clone()));

    let (moderation, moderation_rx) = ModerationQueue::new();
    let cancel = CancellationToken::new();
    let worker = ModerationWorker::new(
        pool.clone(),
        site_config.clone(),
        Arc::clone(&classifier),
        Arc::clone(&notifier),
    );
    tokio::spawn(worker.run(moderation_rx, cancel.clone()));

    let state = AppState {
        pool,
        config: Arc::new(config.clone()),
        site_config,
        moderation,
        notifier,
    };
    let router = build_app_router(state.clone(), &config);

    TestApp {
        router,
        state,
        cancel,
    }
}

/// Fire one request at the router and decode the JSON body (Null when empty).
pub async fn request_json(
    router: &Router,
    method: Method,
    uri: &str,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(value) => builder
            .header(CONTENT_TYPE, "application/json")
            .body(Body::from(value.to_string())),
        None => builder.body(Body::empty()),
    }
    .expect("request construction");

    let response = router
        .clone()
        .oneshot(request)
        .await
        .expect("router call");
    let status = response.status();
    let bytes = response
        .into_body()
        .collect()
        .await
        .expect("body collect")
        .to_bytes();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).expect("JSON body")
    };
    (status, value)
}

/// Set the runtime moderation flags and drop the cached snapshot.
pub async fn set_moderation_flags(app: &TestApp, auto: bool, manual: bool) {
    ConfigRepo::update(
        &app.state.pool,
        &UpdateSiteConfig {
            auto_moderation_enabled: Some(auto),
            manual_approval_required: Some(manual),
            ..Default::default()
        },
    )
    .await
    .expect("config update");
    app.state.site_config.invalidate().await;
}

/// Poll until the post reaches `expected` (the worker runs asynchronously).
pub async fn wait_for_post_status(pool: &PgPool, post_id: i64, expected: PostStatus) -> bool {
    for _ in 0..80 {
        if let Some(post) = PostRepo::find_by_id(pool, post_id).await.expect("post lookup") {
            if post.current_status() == Some(expected) {
                return true;
            }
        }
        tokio::time::sleep(Duration::from_millis(25)).await;
    }
    false
}

/// A submission request body with free defaults; override fields as needed.
pub fn submission_body(user_external_id: i64, title: &str) -> Value {
    serde_json::json!({
        "user_external_id": user_external_id,
        "username": "tester",
        "kind": "job",
        "title": title,
        "description": "integration test post",
        "price": 1500,
        "currency": "UAH",
        "city_id": 1,
        "rubric_id": 1,
    })
}
