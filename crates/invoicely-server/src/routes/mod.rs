//! Route configuration for the Invoicely API server.

mod internal;
mod v1;

use crate::error::ApiError;
use crate::middleware::cors_layer;
use crate::state::AppState;
use axum::{http::HeaderName, Router};
use tower::ServiceBuilder;
use tower_http::{
    catch_panic::CatchPanicLayer,
    compression::CompressionLayer,
    limit::RequestBodyLimitLayer,
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    services::ServeDir,
    timeout::TimeoutLayer,
};

/// Mount point of the versioned API.
pub const API_PREFIX: &str = "/api/v1";

/// Create the main application router.
pub fn create_router(state: AppState) -> Router {
    let config = state.config.clone();
    let request_id = HeaderName::from_static("x-request-id");

    // Common middleware stack applied to all routes
    let common_middleware = ServiceBuilder::new()
        .layer(SetRequestIdLayer::new(request_id.clone(), MakeRequestUuid))
        .layer(PropagateRequestIdLayer::new(request_id))
        .layer(CatchPanicLayer::new())
        .layer(RequestBodyLimitLayer::new(config.server.body_limit_bytes))
        .layer(TimeoutLayer::new(config.server.request_timeout()))
        .layer(CompressionLayer::new());

    Router::new()
        .nest(API_PREFIX, v1::router(&state))
        .nest("/internal", internal::router(&state))
        .nest_service(
            &config.upload.public_path,
            ServeDir::new(&config.upload.dir),
        )
        .fallback(fallback_handler)
        .layer(common_middleware)
        .layer(cors_layer(&config.cors))
        .with_state(state)
}

async fn fallback_handler() -> ApiError {
    ApiError::NotFound("Route".into())
}
