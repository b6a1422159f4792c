//! Response cache keys.
//!
//! A key is `{path}[?{query}][#{scope}]`. The path comes first so a whole
//! resource can be dropped with [`Cache::delete_prefix`](super::Cache::delete_prefix).

use axum::http::{Method, Uri};
use url::form_urlencoded;

pub struct CacheKey;

impl CacheKey {
    /// Key for a request, or `None` when the method is not cacheable.
    pub fn for_request(method: &Method, uri: &Uri, scope: Option<&str>) -> Option<String> {
        if method != Method::GET {
            return None;
        }

        let mut key = normalize_path(uri.path());

        if let Some(query) = uri.query().map(normalize_query).filter(|q| !q.is_empty()) {
            key.push('?');
            key.push_str(&query);
        }

        if let Some(scope) = scope {
            key.push('#');
            key.push_str(scope);
        }

        Some(key)
    }

    /// Scope for a single user.
    pub fn user_scope(user_id: impl std::fmt::Display) -> String {
        format!("user:{user_id}")
    }

    /// Scope shared by everyone holding the same roles.
    pub fn roles_scope(roles: &[String]) -> String {
        let mut roles = roles.to_vec();
        roles.sort();
        roles.dedup();
        format!("roles:{}", roles.join(","))
    }

    /// `/api/v1/<resource>` for a request path under `api_prefix`.
    pub fn resource_prefix(path: &str, api_prefix: &str) -> Option<String> {
        let path = normalize_path(path);
        let rest = path.strip_prefix(api_prefix)?.strip_prefix('/')?;
        let resource = rest.split('/').next().filter(|s| !s.is_empty())?;
        Some(format!("{api_prefix}/{resource}"))
    }
}

/// Collapse repeated slashes and drop a trailing slash, except at the root.
pub fn normalize_path(path: &str) -> String {
    let mut out = String::with_capacity(path.len() + 1);
    for segment in path.split('/').filter(|s| !s.is_empty()) {
        out.push('/');
        out.push_str(segment);
    }
    if out.is_empty() {
        out.push('/');
    }
    out
}

/// Decode, sort by key then value, and re-encode.
pub fn normalize_query(query: &str) -> String {
    let mut pairs: Vec<(String, String)> = form_urlencoded::parse(query.as_bytes())
        .map(|(k, v)| (k.into_owned(), v.into_owned()))
        .collect();
    pairs.sort();

    form_urlencoded::Serializer::new(String::new())
        .extend_pairs(pairs)
        .finish()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn key(method: Method, uri: &str) -> Option<String> {
        CacheKey::for_request(&method, &uri.parse().unwrap(), None)
    }

    #[test]
    fn test_only_get_is_keyed() {
        assert!(key(Method::GET, "/api/v1/dashboard").is_some());
        for method in [Method::POST, Method::PUT, Method::PATCH, Method::DELETE, Method::HEAD] {
            assert!(key(method, "/api/v1/dashboard").is_none());
        }
    }

    #[test]
    fn test_path_normalization() {
        assert_eq!(normalize_path("/api//v1/dashboard/"), "/api/v1/dashboard");
        assert_eq!(normalize_path("/"), "/");
        assert_eq!(normalize_path("//"), "/");
        assert_eq!(normalize_path("/Dashboard"), "/Dashboard");
    }

    #[test]
    fn test_query_order_does_not_matter() {
        assert_eq!(
            key(Method::GET, "/api/v1/activity-logs?page=2&action=upload"),
            key(Method::GET, "/api/v1/activity-logs?action=upload&page=2"),
        );
        assert_eq!(
            key(Method::GET, "/x?a=%20b").unwrap(),
            key(Method::GET, "/x?a=+b").unwrap(),
        );
        assert_eq!(key(Method::GET, "/x?").unwrap(), "/x");
    }

    #[test]
    fn test_scope_is_appended() {
        let uri: Uri = "/api/v1/dashboard?range=30d".parse().unwrap();
        let scoped = CacheKey::for_request(&Method::GET, &uri, Some(&CacheKey::user_scope(7)));
        assert_eq!(scoped.unwrap(), "/api/v1/dashboard?range=30d#user:7");
    }

    #[test]
    fn test_roles_scope_is_order_independent() {
        let a = CacheKey::roles_scope(&["admin".into(), "user".into()]);
        let b = CacheKey::roles_scope(&["user".into(), "admin".into(), "user".into()]);
        assert_eq!(a, b);
        assert_eq!(a, "roles:admin,user");
    }

    #[test]
    fn test_resource_prefix() {
        assert_eq!(
            CacheKey::resource_prefix("/api/v1/upload/logo", "/api/v1").as_deref(),
            Some("/api/v1/upload")
        );
        assert_eq!(
            CacheKey::resource_prefix("/api/v1//notifications/", "/api/v1").as_deref(),
            Some("/api/v1/notifications")
        );
        assert_eq!(CacheKey::resource_prefix("/api/v1", "/api/v1"), None);
        assert_eq!(CacheKey::resource_prefix("/internal/health", "/api/v1"), None);
    }

    proptest! {
        #[test]
        fn prop_normalized_path_is_stable(path in "(/[a-z]{0,3}){0,6}/?") {
            let once = normalize_path(&path);
            prop_assert_eq!(normalize_path(&once), once.clone());
            prop_assert!(!once.contains("//"));
            prop_assert!(once == "/" || !once.ends_with('/'));
        }
    }
}
