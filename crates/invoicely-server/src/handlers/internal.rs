//! Health checks and cache administration.

use crate::cache::{Cache, CacheStats};
use crate::error::ApiResult;
use crate::middleware::AdminAuth;
use crate::state::AppState;
use axum::{extract::State, response::IntoResponse, Json};
use serde::Serialize;
use serde_json::json;
use tracing::info;

pub async fn health_check() -> impl IntoResponse {
    Json(json!({
        "status": "ok",
        "timestamp": chrono::Utc::now().to_rfc3339(),
        "version": env!("CARGO_PKG_VERSION")
    }))
}

pub async fn liveness() -> impl IntoResponse {
    Json(json!({
        "status": "alive",
        "timestamp": chrono::Utc::now().to_rfc3339()
    }))
}

pub async fn readiness(State(state): State<AppState>) -> impl IntoResponse {
    let status = |ok: bool, otherwise: &'static str| if ok { "ok" } else { otherwise };
    let cache = status(state.config.cache.enabled, "disabled");
    let email = status(state.notifier.provider_status().configured, "unconfigured");
    let uploads = status(state.uploads.root().is_dir(), "missing");

    Json(json!({
        "status": "ready",
        "timestamp": chrono::Utc::now().to_rfc3339(),
        "checks": {
            "cache": cache,
            "email": email,
            "uploads": uploads
        }
    }))
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CacheStatsResponse {
    #[serde(flatten)]
    pub stats: CacheStats,
    pub hit_rate: f64,
    pub enabled: bool,
}

pub async fn cache_stats(
    State(state): State<AppState>,
    AdminAuth(_user): AdminAuth,
) -> Json<CacheStatsResponse> {
    let stats = state.cache.stats().await;
    Json(CacheStatsResponse {
        hit_rate: stats.hit_rate(),
        stats,
        enabled: state.config.cache.enabled,
    })
}

pub async fn clear_cache(
    State(state): State<AppState>,
    AdminAuth(user): AdminAuth,
) -> ApiResult<impl IntoResponse> {
    let cleared = state.cache.len();
    state.cache.clear().await.map_err(anyhow::Error::from)?;
    info!(cleared, admin = %user.email, "Response cache cleared");

    Ok(Json(json!({
        "status": "ok",
        "message": "Cache cleared",
        "cleared": cleared
    })))
}
