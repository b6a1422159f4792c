use crate::EmailMessage;
use async_trait::async_trait;
use invoicely_common_http::{HttpError, ResponseError};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeliveryStatus {
    Sent,
    Queued,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SendReceipt {
    pub message_id: String,
    pub status: DeliveryStatus,
}

#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("Missing API key for {0}")]
    MissingApiKey(&'static str),

    #[error("{0}")]
    Http(#[from] HttpError),

    #[error("{0}")]
    Response(#[from] ResponseError),

    #[error("{0} did not return a message id")]
    MissingMessageId(&'static str),

    #[error("no response within {0:?}")]
    Timeout(Duration),

    #[error("{0}")]
    Rejected(String),
}

#[async_trait]
pub trait EmailProvider: Send + Sync {
    fn name(&self) -> &str;

    /// Whether credentials are present.
    fn is_configured(&self) -> bool;

    /// Deliver one message. `from` is already filled in.
    async fn send(&self, message: &EmailMessage) -> Result<SendReceipt, ProviderError>;
}
