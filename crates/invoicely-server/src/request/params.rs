use crate::error::ApiError;
use axum::http::HeaderMap;
use std::collections::HashMap;

/// Query of `GET /i18n/translate`: `key` is required, `lang` picks the
/// locale, every other parameter is a placeholder value.
#[derive(Debug, Clone)]
pub struct TranslateParams {
    pub key: String,
    pub vars: Vec<(String, String)>,
}

impl TryFrom<HashMap<String, String>> for TranslateParams {
    type Error = ApiError;

    fn try_from(mut query: HashMap<String, String>) -> Result<Self, Self::Error> {
        let key = query
            .remove("key")
            .filter(|k| !k.trim().is_empty())
            .ok_or_else(|| ApiError::field("key", "Translation key is required"))?;
        query.remove("lang");

        let mut vars: Vec<_> = query.into_iter().collect();
        vars.sort();
        Ok(Self { key, vars })
    }
}

/// Caller address as reported by the proxy, if any.
pub fn client_ip(headers: &HeaderMap) -> Option<String> {
    headers
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .map(|ip| ip.trim().to_string())
        .filter(|ip| !ip.is_empty())
        .or_else(|| {
            headers
                .get("x-real-ip")
                .and_then(|v| v.to_str().ok())
                .map(str::to_string)
        })
}
