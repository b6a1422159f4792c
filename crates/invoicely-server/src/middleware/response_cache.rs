//! GET response cache in front of the API handlers.
//!
//! Must be layered inside [`AuthLayer`](super::auth::AuthLayer) so the caller
//! is known when the key is built. Keys and invalidation prefixes use the
//! full request path, including any prefix a `nest` stripped.

use super::auth::AuthUser;
use crate::cache::{Cache, CacheExt, CacheKey};
use crate::config::CacheConfig;
use crate::error::ApiError;
use axum::{
    body::Body,
    extract::OriginalUri,
    http::{header, HeaderName, HeaderValue, Method, Request, StatusCode, Uri},
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use std::convert::Infallible;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};
use std::time::Duration;
use tower::{Layer, Service};
use tracing::{debug, warn};

/// Header reporting whether a response came from the cache.
pub const X_CACHE: &str = "x-cache";

/// Response cache behaviour.
#[derive(Debug, Clone)]
pub struct ResponseCacheSettings {
    pub ttl: Duration,
    pub max_body_bytes: usize,
    pub vary_by_user: bool,
    pub invalidate_on_write: bool,
    /// Prefix stripped when computing the resource of a write.
    pub api_prefix: String,
}

impl ResponseCacheSettings {
    pub fn from_config(config: &CacheConfig, api_prefix: impl Into<String>) -> Self {
        Self {
            ttl: config.ttl(),
            max_body_bytes: config.max_body_bytes,
            vary_by_user: config.vary_by_user,
            invalidate_on_write: config.invalidate_on_write,
            api_prefix: api_prefix.into(),
        }
    }
}

/// A response as stored in the cache.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CachedResponse {
    pub status: u16,
    pub headers: Vec<(String, String)>,
    #[serde(with = "base64_body")]
    pub body: Vec<u8>,
}

impl CachedResponse {
    fn capture(parts: &axum::http::response::Parts, body: &[u8]) -> Self {
        let headers = parts
            .headers
            .iter()
            .filter(|(name, _)| **name != header::CONTENT_LENGTH && name.as_str() != X_CACHE)
            .filter_map(|(name, value)| {
                value
                    .to_str()
                    .ok()
                    .map(|v| (name.as_str().to_string(), v.to_string()))
            })
            .collect();

        Self {
            status: parts.status.as_u16(),
            headers,
            body: body.to_vec(),
        }
    }

    fn into_response(self) -> Response {
        let status = StatusCode::from_u16(self.status).unwrap_or(StatusCode::OK);
        let mut response = Response::new(Body::from(self.body));
        *response.status_mut() = status;

        let headers = response.headers_mut();
        for (name, value) in self.headers {
            if let (Ok(name), Ok(value)) = (
                HeaderName::from_bytes(name.as_bytes()),
                HeaderValue::from_str(&value),
            ) {
                headers.append(name, value);
            }
        }
        headers.insert(X_CACHE, HeaderValue::from_static("HIT"));
        response
    }
}

mod base64_body {
    use base64::{engine::general_purpose::STANDARD, Engine as _};
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(bytes: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&STANDARD.encode(bytes))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u8>, D::Error> {
        let encoded = String::deserialize(deserializer)?;
        STANDARD.decode(encoded).map_err(serde::de::Error::custom)
    }
}

/// Tower layer serving repeated GETs from a [`Cache`].
#[derive(Clone)]
pub struct ResponseCacheLayer {
    cache: Arc<dyn Cache>,
    settings: Arc<ResponseCacheSettings>,
}

impl ResponseCacheLayer {
    pub fn new(cache: Arc<dyn Cache>, settings: ResponseCacheSettings) -> Self {
        Self {
            cache,
            settings: Arc::new(settings),
        }
    }
}

impl<S> Layer<S> for ResponseCacheLayer {
    type Service = ResponseCacheService<S>;

    fn layer(&self, inner: S) -> Self::Service {
        ResponseCacheService {
            inner,
            cache: self.cache.clone(),
            settings: self.settings.clone(),
        }
    }
}

#[derive(Clone)]
pub struct ResponseCacheService<S> {
    inner: S,
    cache: Arc<dyn Cache>,
    settings: Arc<ResponseCacheSettings>,
}

impl<S> Service<Request<Body>> for ResponseCacheService<S>
where
    S: Service<Request<Body>, Response = Response, Error = Infallible> + Clone + Send + 'static,
    S::Future: Send + 'static,
{
    type Response = Response;
    type Error = Infallible;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>> + Send>>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, req: Request<Body>) -> Self::Future {
        let cache = self.cache.clone();
        let settings = self.settings.clone();
        let clone = self.inner.clone();
        let mut inner = std::mem::replace(&mut self.inner, clone);

        Box::pin(async move {
            let uri = full_uri(&req);
            if req.method() != Method::GET {
                let path = uri.path().to_string();
                let response = inner.call(req).await?;
                if settings.invalidate_on_write && response.status().is_success() {
                    invalidate(cache.as_ref(), &path, &settings.api_prefix).await;
                }
                return Ok(response);
            }

            let scope = request_scope(&req, settings.vary_by_user);
            let Some(key) = CacheKey::for_request(req.method(), &uri, scope.as_deref())
            else {
                return inner.call(req).await;
            };

            match cache.get::<CachedResponse>(&key).await {
                Ok(Some(cached)) => {
                    debug!(key = %key, "Serving cached response");
                    return Ok(cached.into_response());
                }
                Ok(None) => {}
                Err(err) => warn!(key = %key, error = %err, "Cache lookup failed"),
            }

            let response = inner.call(req).await?;
            Ok(store(cache.as_ref(), &key, response, &settings).await)
        })
    }
}

fn full_uri(req: &Request<Body>) -> Uri {
    req.extensions()
        .get::<OriginalUri>()
        .map(|original| original.0.clone())
        .unwrap_or_else(|| req.uri().clone())
}

fn request_scope(req: &Request<Body>, vary_by_user: bool) -> Option<String> {
    let user = req.extensions().get::<AuthUser>()?;
    Some(if vary_by_user {
        CacheKey::user_scope(user.id)
    } else {
        CacheKey::roles_scope(&user.roles)
    })
}

async fn invalidate(cache: &dyn Cache, path: &str, api_prefix: &str) {
    let Some(prefix) = CacheKey::resource_prefix(path, api_prefix) else {
        return;
    };
    match cache.delete_prefix(&prefix).await {
        Ok(removed) => debug!(prefix = %prefix, removed, "Invalidated cached responses"),
        Err(err) => warn!(prefix = %prefix, error = %err, "Cache invalidation failed"),
    }
}

async fn store(
    cache: &dyn Cache,
    key: &str,
    response: Response,
    settings: &ResponseCacheSettings,
) -> Response {
    let cacheable = response.status().is_success()
        && !response.headers().contains_key(header::SET_COOKIE)
        && content_length(&response).map_or(true, |len| len <= settings.max_body_bytes);
    if !cacheable {
        return response;
    }

    let (mut parts, body) = response.into_parts();
    let bytes = match axum::body::to_bytes(body, usize::MAX).await {
        Ok(bytes) => bytes,
        Err(err) => {
            return ApiError::Internal(anyhow::anyhow!("reading response body: {err}"))
                .into_response()
        }
    };

    if bytes.len() <= settings.max_body_bytes {
        let cached = CachedResponse::capture(&parts, &bytes);
        match cache.set(key, &cached, settings.ttl).await {
            Ok(()) => {
                parts
                    .headers
                    .insert(X_CACHE, HeaderValue::from_static("MISS"));
            }
            Err(err) => warn!(key = %key, error = %err, "Cache store failed"),
        }
    } else {
        debug!(key = %key, size = bytes.len(), "Response too large to cache");
    }

    Response::from_parts(parts, Body::from(bytes))
}

fn content_length(response: &Response) -> Option<usize> {
    response
        .headers()
        .get(header::CONTENT_LENGTH)?
        .to_str()
        .ok()?
        .parse()
        .ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::{CacheError, CacheResult, CacheStats, MemoryCache};
    use async_trait::async_trait;
    use axum::{
        routing::{get, post},
        Router,
    };
    use bytes::Bytes;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tower::ServiceExt;

    fn settings() -> ResponseCacheSettings {
        ResponseCacheSettings::from_config(&CacheConfig::default(), "/api/v1")
    }

    fn app(cache: Arc<dyn Cache>, settings: ResponseCacheSettings) -> (Router, Arc<AtomicUsize>) {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = calls.clone();
        let writes = calls.clone();
        let router = Router::new()
            .route(
                "/api/v1/items",
                get(move || async move {
                    let n = counter.fetch_add(1, Ordering::SeqCst);
                    format!("call {n}")
                })
                .post(move || async move {
                    writes.fetch_add(1, Ordering::SeqCst);
                    StatusCode::CREATED
                }),
            )
            .route("/api/v1/missing", get(|| async { StatusCode::NOT_FOUND }))
            .route("/api/v1/big", get(|| async { "x".repeat(64) }))
            .route("/api/v1/other", post(|| async { StatusCode::OK }))
            .route(
                "/api/v1/session",
                get(|| async { ([(header::SET_COOKIE, "sid=abc; HttpOnly")], "session") }),
            )
            .layer(ResponseCacheLayer::new(cache, settings));
        (router, calls)
    }

    fn req(method: Method, uri: &str) -> Request<Body> {
        Request::builder()
            .method(method)
            .uri(uri)
            .body(Body::empty())
            .unwrap()
    }

    async fn text(response: Response) -> String {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    #[tokio::test]
    async fn test_second_get_is_served_from_cache() {
        let (router, calls) = app(Arc::new(MemoryCache::new()), settings());

        let first = router
            .clone()
            .oneshot(req(Method::GET, "/api/v1/items?b=2&a=1"))
            .await
            .unwrap();
        assert_eq!(first.headers()[X_CACHE], "MISS");
        assert_eq!(text(first).await, "call 0");

        let second = router
            .oneshot(req(Method::GET, "/api/v1/items?a=1&b=2"))
            .await
            .unwrap();
        assert_eq!(second.headers()[X_CACHE], "HIT");
        assert_eq!(second.headers()[header::CONTENT_TYPE], "text/plain; charset=utf-8");
        assert_eq!(text(second).await, "call 0");
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_post_never_touches_cache() {
        let cache = Arc::new(MemoryCache::new());
        let (router, calls) = app(cache.clone(), settings());

        for _ in 0..2 {
            let response = router.clone().oneshot(req(Method::POST, "/api/v1/items")).await.unwrap();
            assert_eq!(response.status(), StatusCode::CREATED);
            assert!(response.headers().get(X_CACHE).is_none());
        }
        assert_eq!(calls.load(Ordering::SeqCst), 2);
        assert!(cache.is_empty());
        assert_eq!(cache.stats().await.misses, 0);
    }

    #[tokio::test]
    async fn test_errors_are_not_cached() {
        let cache = Arc::new(MemoryCache::new());
        let (router, _) = app(cache.clone(), settings());

        let response = router.oneshot(req(Method::GET, "/api/v1/missing")).await.unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert!(response.headers().get(X_CACHE).is_none());
        assert!(cache.is_empty());
    }

    #[tokio::test]
    async fn test_large_bodies_pass_through() {
        let cache = Arc::new(MemoryCache::new());
        let mut settings = settings();
        settings.max_body_bytes = 16;
        let (router, _) = app(cache.clone(), settings);

        let response = router.oneshot(req(Method::GET, "/api/v1/big")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(text(response).await.len(), 64);
        assert!(cache.is_empty());
    }

    #[tokio::test]
    async fn test_write_invalidates_resource_when_enabled() {
        let cache = Arc::new(MemoryCache::new());
        let mut settings = settings();
        settings.invalidate_on_write = true;
        let (router, calls) = app(cache.clone(), settings);

        router.clone().oneshot(req(Method::GET, "/api/v1/items")).await.unwrap();
        router.clone().oneshot(req(Method::POST, "/api/v1/other")).await.unwrap();
        assert_eq!(cache.len(), 1);

        router.clone().oneshot(req(Method::POST, "/api/v1/items")).await.unwrap();
        assert!(cache.is_empty());

        let response = router.oneshot(req(Method::GET, "/api/v1/items")).await.unwrap();
        assert_eq!(response.headers()[X_CACHE], "MISS");
        // The counter is shared with the POST handler.
        assert_eq!(text(response).await, "call 2");
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_set_cookie_responses_are_never_stored() {
        let cache = Arc::new(MemoryCache::new());
        let (router, _) = app(cache.clone(), settings());

        for _ in 0..2 {
            let response = router.clone().oneshot(req(Method::GET, "/api/v1/session")).await.unwrap();
            assert_eq!(response.status(), StatusCode::OK);
            assert!(response.headers().get(X_CACHE).is_none());
            assert!(response.headers().contains_key(header::SET_COOKIE));
        }
        assert!(cache.is_empty());
    }

    #[tokio::test]
    async fn test_nested_router_keys_and_invalidates_full_path() {
        let cache = Arc::new(MemoryCache::new());
        let mut settings = settings();
        settings.invalidate_on_write = true;
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = calls.clone();
        let inner = Router::new()
            .route(
                "/items",
                get(move || async move {
                    counter.fetch_add(1, Ordering::SeqCst);
                    "items"
                })
                .post(|| async { StatusCode::CREATED }),
            )
            .layer(ResponseCacheLayer::new(cache.clone(), settings));
        let router = Router::new().nest("/api/v1", inner);

        let response = router.clone().oneshot(req(Method::GET, "/api/v1/items?x=1")).await.unwrap();
        assert_eq!(response.headers()[X_CACHE], "MISS");
        assert!(cache.exists("/api/v1/items?x=1").await.unwrap());

        let response = router.clone().oneshot(req(Method::POST, "/api/v1/items")).await.unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);
        assert!(cache.is_empty());

        let response = router.oneshot(req(Method::GET, "/api/v1/items?x=1")).await.unwrap();
        assert_eq!(response.headers()[X_CACHE], "MISS");
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    fn as_caller(mut request: Request<Body>, roles: &[&str]) -> Request<Body> {
        let claims = crate::middleware::auth::Claims::new_access(
            uuid::Uuid::new_v4(),
            "caller@acme.test",
            roles.iter().map(|r| r.to_string()).collect(),
            3600,
        );
        request
            .extensions_mut()
            .insert(AuthUser::from_claims(claims).unwrap());
        request
    }

    #[tokio::test]
    async fn test_role_scope_shares_entries_between_equal_role_sets() {
        let cache = Arc::new(MemoryCache::new());
        let mut settings = settings();
        settings.vary_by_user = false;
        let (router, calls) = app(cache.clone(), settings);

        let first = router
            .clone()
            .oneshot(as_caller(req(Method::GET, "/api/v1/items"), &["user", "admin"]))
            .await
            .unwrap();
        assert_eq!(first.headers()[X_CACHE], "MISS");

        let same_roles = router
            .clone()
            .oneshot(as_caller(req(Method::GET, "/api/v1/items"), &["admin", "user"]))
            .await
            .unwrap();
        assert_eq!(same_roles.headers()[X_CACHE], "HIT");

        let other_roles = router
            .oneshot(as_caller(req(Method::GET, "/api/v1/items"), &["user"]))
            .await
            .unwrap();
        assert_eq!(other_roles.headers()[X_CACHE], "MISS");
        assert_eq!(calls.load(Ordering::SeqCst), 2);
        assert_eq!(cache.len(), 2);
    }

    struct BrokenCache;

    #[async_trait]
    impl Cache for BrokenCache {
        async fn get_raw(&self, _key: &str) -> CacheResult<Option<Bytes>> {
            Err(CacheError::Backend("down".into()))
        }
        async fn set_raw(&self, _key: &str, _value: Bytes, _ttl: Duration) -> CacheResult<()> {
            Err(CacheError::Backend("down".into()))
        }
        async fn delete(&self, _key: &str) -> CacheResult<bool> {
            Err(CacheError::Backend("down".into()))
        }
        async fn delete_prefix(&self, _prefix: &str) -> CacheResult<u64> {
            Err(CacheError::Backend("down".into()))
        }
        async fn exists(&self, _key: &str) -> CacheResult<bool> {
            Err(CacheError::Backend("down".into()))
        }
        async fn ttl(&self, _key: &str) -> CacheResult<Option<Duration>> {
            Err(CacheError::Backend("down".into()))
        }
        async fn clear(&self) -> CacheResult<()> {
            Err(CacheError::Backend("down".into()))
        }
        async fn stats(&self) -> CacheStats {
            CacheStats::default()
        }
    }

    #[tokio::test]
    async fn test_cache_failure_never_fails_request() {
        let (router, calls) = app(Arc::new(BrokenCache), settings());

        for _ in 0..2 {
            let response = router.clone().oneshot(req(Method::GET, "/api/v1/items")).await.unwrap();
            assert_eq!(response.status(), StatusCode::OK);
            assert!(response.headers().get(X_CACHE).is_none());
        }
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }
}
