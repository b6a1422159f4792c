//! Admin email endpoints.

use crate::error::{ApiError, ApiResult};
use crate::middleware::AdminAuth;
use crate::state::AppState;
use axum::{extract::State, http::StatusCode, Json};
use invoicely_activity_types::{ActivityLog, ActivitySeverity};
use invoicely_notify::{EmailMessage, ProviderStatus, SendReceipt};
use serde::{Deserialize, Serialize};

/// Upper bound on messages in one batch request.
pub const MAX_BATCH: usize = 100;

#[derive(Debug, Deserialize)]
pub struct BatchRequest {
    pub messages: Vec<EmailMessage>,
    /// Report every outcome instead of stopping at the first failure.
    #[serde(default)]
    pub settled: bool,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchOutcome {
    pub index: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub receipt: Option<SendReceipt>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum BatchResponse {
    Receipts(Vec<SendReceipt>),
    Settled(Vec<BatchOutcome>),
}

pub async fn send_email(
    State(state): State<AppState>,
    AdminAuth(user): AdminAuth,
    Json(message): Json<EmailMessage>,
) -> ApiResult<(StatusCode, Json<SendReceipt>)> {
    let subject = message.subject.clone();
    let result = state.notifier.send_email(message).await;

    let severity = if result.is_ok() {
        ActivitySeverity::Info
    } else {
        ActivitySeverity::Warning
    };
    state
        .journal
        .record(
            ActivityLog::builder(user.id, user.email, "send_email", "notification")
                .details(subject)
                .severity(severity)
                .build(),
        )
        .await;

    Ok((StatusCode::ACCEPTED, Json(result?)))
}

pub async fn send_batch(
    State(state): State<AppState>,
    AdminAuth(_user): AdminAuth,
    Json(request): Json<BatchRequest>,
) -> ApiResult<(StatusCode, Json<BatchResponse>)> {
    if request.messages.is_empty() {
        return Err(ApiError::field("messages", "At least one message is required"));
    }
    if request.messages.len() > MAX_BATCH {
        return Err(ApiError::field(
            "messages",
            format!("At most {MAX_BATCH} messages per batch"),
        ));
    }

    let response = if request.settled {
        let outcomes = state
            .notifier
            .send_batch_settled(request.messages)
            .await
            .into_iter()
            .enumerate()
            .map(|(index, result)| match result {
                Ok(receipt) => BatchOutcome {
                    index,
                    receipt: Some(receipt),
                    error: None,
                },
                Err(err) => BatchOutcome {
                    index,
                    receipt: None,
                    error: Some(err.to_string()),
                },
            })
            .collect();
        BatchResponse::Settled(outcomes)
    } else {
        BatchResponse::Receipts(state.notifier.send_batch(request.messages).await?)
    };

    Ok((StatusCode::ACCEPTED, Json(response)))
}

pub async fn provider_status(
    State(state): State<AppState>,
    AdminAuth(_user): AdminAuth,
) -> Json<ProviderStatus> {
    Json(state.notifier.provider_status())
}
