use std::sync::Arc;

use crate::config::ServerConfig;
use crate::config_cache::ConfigCache;
use crate::moderation::ModerationQueue;
use crate::notifier::Notifier;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// This is cheaply cloneable (inner data is behind `Arc` or is already `Clone`).
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub pool: gigboard_db::DbPool,
    /// Server configuration.
    pub config: Arc<ServerConfig>,
    /// Cached site configuration singleton.
    pub site_config: ConfigCache,
    /// Producer half of the moderation channel.
    pub moderation: ModerationQueue,
    /// Best-effort chat notifier.
    pub notifier: Arc<Notifier>,
}
