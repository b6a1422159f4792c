//! Internal routes for health checks and admin operations.

use crate::handlers::internal::{cache_stats, clear_cache, health_check, liveness, readiness};
use crate::middleware::AuthLayer;
use crate::state::AppState;
use axum::{
    routing::{get, post},
    Router,
};

/// Create the internal routes router.
pub fn router(state: &AppState) -> Router<AppState> {
    Router::new()
        // Health checks
        .route("/health", get(health_check))
        .route("/health/live", get(liveness))
        .route("/health/ready", get(readiness))
        .nest("/admin", admin_routes(state))
}

fn admin_routes(state: &AppState) -> Router<AppState> {
    Router::new()
        .route("/cache/clear", post(clear_cache))
        .route("/cache/stats", get(cache_stats))
        .layer(AuthLayer::new(state.config.auth.jwt_secret.clone()))
}
