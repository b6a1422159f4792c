//! API v1 routes.

use super::API_PREFIX;
use crate::config::UploadConfig;
use crate::handlers::{activity, dashboard, i18n, notifications, upload};
use crate::middleware::{AuthLayer, ResponseCacheLayer, ResponseCacheSettings};
use crate::state::AppState;
use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};

/// Headroom over the file limit for multipart framing.
const MULTIPART_SLACK: u64 = 64 * 1024;

/// Create the v1 API router.
pub fn router(state: &AppState) -> Router<AppState> {
    let mut protected = Router::new()
        .nest("/upload", upload_routes(&state.config.upload))
        .nest("/dashboard", dashboard_routes())
        .nest("/notifications", notification_routes())
        .route("/activity-logs", get(activity::list_activity));

    if state.config.cache.enabled {
        protected = protected.layer(ResponseCacheLayer::new(
            state.cache.clone(),
            ResponseCacheSettings::from_config(&state.config.cache, API_PREFIX),
        ));
    }

    // Added last so it runs before the cache.
    let protected = protected.layer(AuthLayer::new(state.config.auth.jwt_secret.clone()));

    Router::new().nest("/i18n", i18n_routes()).merge(protected)
}

fn i18n_routes() -> Router<AppState> {
    Router::new()
        .route("/locales", get(i18n::list_locales))
        .route("/translate", get(i18n::translate))
        .route("/catalog/:locale", get(i18n::catalog))
}

fn upload_routes(config: &UploadConfig) -> Router<AppState> {
    let limit = |bytes: u64| DefaultBodyLimit::max((bytes + MULTIPART_SLACK) as usize);

    Router::new()
        .route(
            "/logo",
            post(upload::upload_logo).layer(limit(config.logo_max_bytes)),
        )
        .route(
            "/attachment",
            post(upload::upload_attachment).layer(limit(config.attachment_max_bytes)),
        )
}

fn dashboard_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(dashboard::dashboard))
        .route("/user", get(dashboard::user_dashboard))
        .route("/admin", get(dashboard::admin_dashboard))
        .route("/super-admin", get(dashboard::super_admin_dashboard))
}

fn notification_routes() -> Router<AppState> {
    Router::new()
        .route("/email", post(notifications::send_email))
        .route("/batch", post(notifications::send_batch))
        .route("/status", get(notifications::provider_status))
}
