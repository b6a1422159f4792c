use crate::state::AppState;
use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{header, request::Parts},
};
use invoicely_common_i18n::{detect::negotiate_accept_language, Locale, LocaleContext};
use std::convert::Infallible;
use url::form_urlencoded;

/// Locale selected for this request.
///
/// Resolution order: `lang` query parameter, `locale` cookie,
/// `Accept-Language`, then the configured default.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RequestLocale(pub Locale);

impl RequestLocale {
    pub fn context(self) -> LocaleContext {
        LocaleContext::new(self.0)
    }

    pub fn resolve(parts: &Parts, default_locale: Locale) -> Locale {
        from_query(parts)
            .or_else(|| from_cookie(parts))
            .or_else(|| from_accept_language(parts))
            .unwrap_or(default_locale)
    }
}

#[async_trait]
impl FromRequestParts<AppState> for RequestLocale {
    type Rejection = Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        Ok(Self(Self::resolve(parts, state.i18n.default_locale())))
    }
}

fn from_query(parts: &Parts) -> Option<Locale> {
    let query = parts.uri.query()?;
    form_urlencoded::parse(query.as_bytes())
        .find(|(k, _)| k == "lang")
        .and_then(|(_, v)| Locale::parse(&v))
}

fn from_cookie(parts: &Parts) -> Option<Locale> {
    parts
        .headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|cookies| cookies.split(';'))
        .find_map(|cookie| cookie.trim().strip_prefix("locale="))
        .and_then(Locale::parse)
}

fn from_accept_language(parts: &Parts) -> Option<Locale> {
    let value = parts.headers.get(header::ACCEPT_LANGUAGE)?.to_str().ok()?;
    negotiate_accept_language(value)
}
