//! Translation catalog endpoints.

use crate::error::{ApiResult, ErrorContext};
use crate::request::{RequestLocale, TranslateParams};
use crate::state::AppState;
use axum::{
    extract::{Path, Query, State},
    Json,
};
use invoicely_common_i18n::Locale;
use serde::Serialize;
use std::collections::HashMap;

#[derive(Debug, Serialize)]
pub struct LocaleInfo {
    pub code: &'static str,
    pub name: &'static str,
    pub default: bool,
}

#[derive(Debug, Serialize)]
pub struct Translation {
    pub key: String,
    pub locale: &'static str,
    pub text: String,
}

#[derive(Debug, Serialize)]
pub struct CatalogResponse {
    pub locale: &'static str,
    pub messages: serde_json::Value,
}

pub async fn list_locales(State(state): State<AppState>) -> Json<Vec<LocaleInfo>> {
    let default_locale = state.i18n.default_locale();
    let locales = state
        .i18n
        .list_locales()
        .into_iter()
        .map(|locale| LocaleInfo {
            code: locale.code(),
            name: locale.name(),
            default: locale == default_locale,
        })
        .collect();
    Json(locales)
}

/// Translate one key. Misses come back as the key itself.
pub async fn translate(
    State(state): State<AppState>,
    locale: RequestLocale,
    Query(query): Query<HashMap<String, String>>,
) -> ApiResult<Json<Translation>> {
    let params = TranslateParams::try_from(query)?;
    let ctx = locale.context();
    let text = state.i18n.translate_with(&ctx, &params.key, params.vars);

    Ok(Json(Translation {
        key: params.key,
        locale: ctx.locale().code(),
        text,
    }))
}

pub async fn catalog(
    State(state): State<AppState>,
    Path(code): Path<String>,
) -> ApiResult<Json<CatalogResponse>> {
    let locale = Locale::parse(&code).not_found(format!("Locale '{code}'"))?;
    let catalog = state
        .i18n
        .catalog(locale)
        .not_found(format!("Locale '{code}'"))?;

    Ok(Json(CatalogResponse {
        locale: locale.code(),
        messages: catalog.to_value(),
    }))
}
