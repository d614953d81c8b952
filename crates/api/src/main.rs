use std::net::SocketAddr;
use std::sync::Arc;

use tokio_util::sync::CancellationToken;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use gigboard_api::config::ServerConfig;
use gigboard_api::config_cache::ConfigCache;
use gigboard_api::moderation::{ModerationClassifier, ModerationQueue, ModerationWorker};
use gigboard_api::notifier::Notifier;
use gigboard_api::router::build_app_router;
use gigboard_api::state::AppState;
use gigboard_api::background;

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    // --- Tracing ---
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "gigboard_api=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // --- Configuration ---
    let config = ServerConfig::from_env();
    tracing::info!(host = %config.host, port = %config.port, "Loaded server configuration");

    // --- Database ---
    let database_url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set");

    let pool = gigboard_db::create_pool(&database_url)
        .await
        .expect("Failed to connect to database");
    tracing::info!("Database connection pool created");

    gigboard_db::health_check(&pool)
        .await
        .expect("Database health check failed");
    tracing::info!("Database health check passed");

    gigboard_db::run_migrations(&pool)
        .await
        .expect("Failed to run database migrations");
    tracing::info!("Database migrations applied");

    // --- Site configuration cache ---
    let site_config = ConfigCache::new(pool.clone());
    site_config
        .get()
        .await
        .expect("Failed to load site configuration");
    tracing::info!("Site configuration loaded");

    // --- Outbound adapters ---
    let classifier = Arc::new(ModerationClassifier::new(
        config.classifier_url.clone(),
        config.classifier_timeout(),
    ));
    let notifier = Arc::new(Notifier::new(config.bot_api_base.clone()));

    // --- Moderation pipeline ---
    let (moderation, moderation_rx) = ModerationQueue::new();
    let cancel = CancellationToken::new();

    let worker = ModerationWorker::new(
        pool.clone(),
        site_config.clone(),
        Arc::clone(&classifier),
        Arc::clone(&notifier),
    );
    let worker_handle = tokio::spawn(worker.run(moderation_rx, cancel.clone()));
    tracing::info!("Moderation worker spawned");

    // --- Scheduled jobs ---
    let expiry_handle = tokio::spawn(background::expiry::run(
        pool.clone(),
        site_config.clone(),
        cancel.clone(),
    ));
    let stats_handle = tokio::spawn(background::stats::run(pool.clone(), cancel.clone()));
    tracing::info!("Background jobs spawned");

    // --- Router & server ---
    let state = AppState {
        pool,
        config: Arc::new(config.clone()),
        site_config,
        moderation,
        notifier,
    };
    let app = build_app_router(state, &config);

    let addr = SocketAddr::new(config.host.parse().expect("Invalid HOST"), config.port);
    tracing::info!("Starting server on {addr}");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind listener");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("Server error");

    // --- Drain background tasks ---
    cancel.cancel();
    let _ = worker_handle.await;
    let _ = expiry_handle.await;
    let _ = stats_handle.await;
    tracing::info!("Shutdown complete");
}

async fn shutdown_signal() {
    tokio::signal::ctrl_c()
        .await
        .expect("Failed to install Ctrl+C handler");
    tracing::info!("Shutdown signal received");
}
