//! Admin configuration surface and manual job triggers.

use axum::extract::State;
use axum::response::IntoResponse;
use axum::Json;
use gigboard_db::models::site_config::UpdateSiteConfig;
use gigboard_db::repositories::ConfigRepo;

use crate::background::{expiry, stats};
use crate::error::AppResult;
use crate::response::DataResponse;
use crate::state::AppState;

/// GET /api/v1/config
pub async fn get_config(State(state): State<AppState>) -> AppResult<impl IntoResponse> {
    let config = state.site_config.get().await?;
    Ok(Json(DataResponse { data: config }))
}

/// PUT /api/v1/config
///
/// Write-through invalidation: the cache drops its snapshot before the
/// response goes out, so no reader sees the old value past this call.
pub async fn update_config(
    State(state): State<AppState>,
    Json(input): Json<UpdateSiteConfig>,
) -> AppResult<impl IntoResponse> {
    let config = ConfigRepo::update(&state.pool, &input).await?;
    state.site_config.invalidate().await;

    tracing::info!("Site configuration updated");
    Ok(Json(DataResponse { data: config }))
}

/// POST /api/v1/admin/archive-expired
///
/// Manual run of the expiry sweep.
pub async fn run_archive(State(state): State<AppState>) -> AppResult<impl IntoResponse> {
    let outcome = expiry::archive_expired_posts(&state.pool, &state.site_config).await;
    Ok(Json(DataResponse { data: outcome }))
}

/// POST /api/v1/admin/collect-stats
///
/// Manual run of the daily stats collection.
pub async fn run_stats(State(state): State<AppState>) -> AppResult<impl IntoResponse> {
    let outcome = stats::collect_daily_stats(&state.pool).await;
    Ok(Json(DataResponse { data: outcome }))
}
