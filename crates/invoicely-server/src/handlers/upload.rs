//! `POST /upload/logo` and `POST /upload/attachment`.

use crate::error::ApiResult;
use crate::middleware::Auth;
use crate::request::client_ip;
use crate::state::AppState;
use crate::upload::{StoredUpload, UploadKind};
use axum::{
    extract::{Multipart, State},
    http::{HeaderMap, StatusCode},
    Json,
};
use invoicely_activity_types::ActivityLog;

pub async fn upload_logo(
    State(state): State<AppState>,
    Auth(user): Auth,
    headers: HeaderMap,
    multipart: Multipart,
) -> ApiResult<(StatusCode, Json<StoredUpload>)> {
    accept(state, user, headers, UploadKind::Logo, multipart).await
}

pub async fn upload_attachment(
    State(state): State<AppState>,
    Auth(user): Auth,
    headers: HeaderMap,
    multipart: Multipart,
) -> ApiResult<(StatusCode, Json<StoredUpload>)> {
    accept(state, user, headers, UploadKind::Attachment, multipart).await
}

async fn accept(
    state: AppState,
    user: crate::middleware::AuthUser,
    headers: HeaderMap,
    kind: UploadKind,
    mut multipart: Multipart,
) -> ApiResult<(StatusCode, Json<StoredUpload>)> {
    let stored = state.uploads.accept(kind, &mut multipart).await?;

    let mut entry = ActivityLog::builder(user.id, user.email, "upload", kind.as_str())
        .details(stored.filename.clone());
    if let Some(ip) = client_ip(&headers) {
        entry = entry.ip_address(ip);
    }
    state.journal.record(entry.build()).await;

    Ok((StatusCode::CREATED, Json(stored)))
}
