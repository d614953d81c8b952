//! Cached access to the site configuration singleton.
//!
//! Reads are served from an in-process snapshot for up to
//! [`CACHE_TTL`]; writers call [`ConfigCache::invalidate`] synchronously
//! after committing, so no reader observes a stale value longer than the
//! cache window and readers racing a write pick up the new row on their
//! next call. The cache is an explicit value passed into component
//! constructors; there is no module-level global.

use std::sync::Arc;
use std::time::{Duration, Instant};

use gigboard_db::models::site_config::SiteConfig;
use gigboard_db::repositories::ConfigRepo;
use gigboard_db::DbPool;
use tokio::sync::RwLock;

/// How long a fetched snapshot stays valid.
const CACHE_TTL: Duration = Duration::from_secs(300);

#[derive(Clone)]
pub struct ConfigCache {
    pool: DbPool,
    inner: Arc<RwLock<Option<Snapshot>>>,
}

struct Snapshot {
    config: SiteConfig,
    fetched_at: Instant,
}

impl ConfigCache {
    pub fn new(pool: DbPool) -> Self {
        Self {
            pool,
            inner: Arc::new(RwLock::new(None)),
        }
    }

    /// The current configuration, from cache when fresh.
    ///
    /// The first call (and the first call after an invalidation) reads
    /// through to [`ConfigRepo::current`], which creates the default row
    /// when absent.
    pub async fn get(&self) -> Result<SiteConfig, sqlx::Error> {
        {
            let guard = self.inner.read().await;
            if let Some(snapshot) = guard.as_ref() {
                if snapshot.fetched_at.elapsed() < CACHE_TTL {
                    return Ok(snapshot.config.clone());
                }
            }
        }

        let config = ConfigRepo::current(&self.pool).await?;
        let mut guard = self.inner.write().await;
        *guard = Some(Snapshot {
            config: config.clone(),
            fetched_at: Instant::now(),
        });
        Ok(config)
    }

    /// Drop the cached snapshot. Call after every configuration write.
    pub async fn invalidate(&self) {
        let mut guard = self.inner.write().await;
        *guard = None;
    }
}
