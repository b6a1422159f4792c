use crate::provider::*;
use crate::{EmailMessage, Recipients};
use invoicely_common_http::HttpClient;
use serde::Serialize;

pub const SENDGRID_API_BASE: &str = "https://api.sendgrid.com";

/// SendGrid v3 mail send adapter.
pub struct SendGridProvider {
    client: HttpClient,
    api_key: Option<String>,
    base_url: String,
}

impl SendGridProvider {
    pub fn new(client: HttpClient, api_key: Option<String>) -> Self {
        Self::with_base_url(client, api_key, SENDGRID_API_BASE)
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
struct SendGridRequest<'a> {
    personalizations: Vec<Personalization<'a>>,
    from: Address<'a>,
    subject: &'a str,
    content: Vec<Content<'a>>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    attachments: Vec<SendGridAttachment<'a>>,
}

#[derive(Debug, Serialize)]
struct Personalization<'a> {
    to: Vec<Address<'a>>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    cc: Vec<Address<'a>>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    bcc: Vec<Address<'a>>,
}

#[derive(Debug, Serialize)]
struct Address<'a> {
    email: &'a str,
}

#[derive(Debug, Serialize)]
struct Content<'a> {
    #[serde(rename = "type")]
    content_type: &'static str,
    value: &'a str,
}

#[derive(Debug, Serialize)]
struct SendGridAttachment<'a> {
    content: &'a str,
    filename: &'a str,
    #[serde(rename = "type")]
    content_type: &'a str,
    disposition: &'static str,
}

fn addresses(recipients: Option<&Recipients>) -> Vec<Address<'_>> {
    recipients
        .map(|r| r.iter().map(|email| Address { email }).collect())
        .unwrap_or_default()
}

impl<'a> SendGridRequest<'a> {
    fn from_message(message: &'a EmailMessage) -> Self {
        // text/plain must precede text/html
        let mut content = Vec::with_capacity(2);
        if let Some(text) = &message.text {
            content.push(Content {
                content_type: "text/plain",
                value: text,
            });
        }
        content.push(Content {
            content_type: "text/html",
            value: &message.html,
        });

        Self {
            personalizations: vec![Personalization {
                to: addresses(Some(&message.to)),
                cc: addresses(message.cc.as_ref()),
                bcc: addresses(message.bcc.as_ref()),
            }],
            from: Address {
                email: message.sender(),
            },
            subject: &message.subject,
            content,
            attachments: message
                .attachments
                .iter()
                .flatten()
                .map(|a| SendGridAttachment {
                    content: &a.content,
                    filename: &a.filename,
                    content_type: &a.content_type,
                    disposition: "attachment",
                })
                .collect(),
        }
    }
}

#[async_trait::async_trait]
impl EmailProvider for SendGridProvider {
    fn name(&self) -> &str {
        "sendgrid"
    }

    fn is_configured(&self) -> bool {
        self.api_key.is_some()
    }

    async fn send(&self, message: &EmailMessage) -> Result<SendReceipt, ProviderError> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or(ProviderError::MissingApiKey("sendgrid"))?;

        let url = format!("{}/v3/mail/send", self.base_url);
        let response = self
            .client
            .post_json_bearer(&url, api_key, &SendGridRequest::from_message(message))
            .await?;

        let message_id = response
            .headers()
            .get("x-message-id")
            .and_then(|v| v.to_str().ok())
            .filter(|v| !v.is_empty())
            .ok_or(ProviderError::MissingMessageId("sendgrid"))?
            .to_string();

        Ok(SendReceipt {
            message_id,
            status: DeliveryStatus::Queued,
        })
    }
}
