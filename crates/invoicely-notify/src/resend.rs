use crate::provider::*;
use crate::EmailMessage;
use invoicely_common_http::{parse_json, HttpClient};
use serde::{Deserialize, Serialize};

pub const RESEND_API_BASE: &str = "https://api.resend.com";

/// Resend adapter.
pub struct ResendProvider {
    client: HttpClient,
    api_key: Option<String>,
    base_url: String,
}

impl ResendProvider {
    pub fn new(client: HttpClient, api_key: Option<String>) -> Self {
        Self::with_base_url(client, api_key, RESEND_API_BASE)
    }

    pub fn with_base_url(
        client: HttpClient,
        api_key: Option<String>,
        base_url: impl Into<String>,
    ) -> Self {
        Self {
            client,
            api_key: api_key.filter(|k| !k.is_empty()),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }
}

#[derive(Debug, Serialize)]
struct ResendRequest<'a> {
    from: &'a str,
    to: Vec<&'a str>,
    subject: &'a str,
    html: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    text: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    cc: Option<Vec<&'a str>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    bcc: Option<Vec<&'a str>>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    attachments: Vec<ResendAttachment<'a>>,
}

#[derive(Debug, Serialize)]
struct ResendAttachment<'a> {
    filename: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ResendResponse {
    id: String,
}

impl<'a> ResendRequest<'a> {
    fn from_message(message: &'a EmailMessage) -> Self {
        Self {
            from: message.sender(),
            to: message.to.iter().collect(),
            subject: &message.subject,
            html: &message.html,
            text: message.text.as_deref(),
            cc: message.cc.as_ref().map(|r| r.iter().collect()),
            bcc: message.bcc.as_ref().map(|r| r.iter().collect()),
            attachments: message
                .attachments
                .iter()
                .flatten()
                .map(|a| ResendAttachment {
                    filename: &a.filename,
                    content: &a.content,
                })
                .collect(),
        }
    }
}

#[async_trait::async_trait]
impl EmailProvider for ResendProvider {
    fn name(&self) -> &str {
        "resend"
    }

    fn is_configured(&self) -> bool {
        self.api_key.is_some()
    }

    async fn send(&self, message: &EmailMessage) -> Result<SendReceipt, ProviderError> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or(ProviderError::MissingApiKey("resend"))?;

        let url = format!("{}/emails", self.base_url);
        let response = self
            .client
            .post_json_bearer(&url, api_key, &ResendRequest::from_message(message))
            .await?;
        let body: ResendResponse = parse_json(response).await?;

        if body.id.is_empty() {
            return Err(ProviderError::MissingMessageId("resend"));
        }

        Ok(SendReceipt {
            message_id: body.id,
            status: DeliveryStatus::Sent,
        })
    }
}
