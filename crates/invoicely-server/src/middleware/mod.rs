//! Middleware for the Invoicely API server.

pub mod auth;
pub mod cors;
pub mod response_cache;

pub use auth::{AdminAuth, Auth, AuthLayer, AuthMiddleware, AuthUser, SuperAdminAuth};
pub use cors::cors_layer;
pub use response_cache::{ResponseCacheLayer, ResponseCacheSettings, X_CACHE};
