//! The sending front end used by the rest of the application.

use crate::provider::{EmailProvider, ProviderError, SendReceipt};
use crate::validate::is_valid_email;
use crate::{build_provider, Attachment, EmailConfig, EmailMessage, Recipients, Result};
use futures::stream::{self, StreamExt, TryStreamExt};
use invoicely_common_log::spans::{delivery_span, record_error};
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tracing::{info, warn, Instrument};

#[derive(Debug, Error)]
pub enum NotifyError {
    #[error("Invalid email address in {field}: {address}")]
    InvalidAddress { field: &'static str, address: String },

    #[error("At least one recipient is required")]
    MissingRecipient,

    #[error("Failed to send email: {cause}")]
    SendFailed {
        provider: String,
        #[source]
        cause: ProviderError,
    },

    #[error("Email provider setup failed: {0}")]
    Setup(#[source] ProviderError),
}

impl NotifyError {
    /// True for errors caused by the caller's input.
    pub fn is_invalid_input(&self) -> bool {
        matches!(self, Self::InvalidAddress { .. } | Self::MissingRecipient)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProviderStatus {
    pub provider: String,
    pub configured: bool,
    pub from_email: String,
}

/// Sends email through one provider.
#[derive(Clone)]
pub struct Notifier {
    provider: Arc<dyn EmailProvider>,
    from_email: String,
    send_timeout: Duration,
    batch_concurrency: usize,
}

impl Notifier {
    pub fn new(provider: Arc<dyn EmailProvider>, config: &EmailConfig) -> Self {
        Self {
            provider,
            from_email: config.from_email.clone(),
            send_timeout: config.send_timeout(),
            batch_concurrency: config.batch_concurrency.max(1),
        }
    }

    /// Build the configured provider and wrap it.
    pub fn from_config(config: &EmailConfig) -> Result<Self> {
        let provider = build_provider(config).map_err(NotifyError::Setup)?;
        Ok(Self::new(provider, config))
    }

    pub fn provider_name(&self) -> &str {
        self.provider.name()
    }

    /// Validate and deliver one message.
    ///
    /// Every address is checked before the provider is contacted.
    pub async fn send_email(&self, mut message: EmailMessage) -> Result<SendReceipt> {
        if message.from.as_deref().map_or(true, str::is_empty) {
            message.from = Some(self.from_email.clone());
        }
        validate(&message)?;

        let provider = self.provider.name().to_string();
        let span = delivery_span(&provider, message.recipient_count());

        async {
            let outcome = tokio::time::timeout(self.send_timeout, self.provider.send(&message))
                .await
                .unwrap_or_else(|_| Err(ProviderError::Timeout(self.send_timeout)));

            match outcome {
                Ok(receipt) => {
                    tracing::Span::current().record("message_id", receipt.message_id.as_str());
                    info!(status = ?receipt.status, "Email delivered to provider");
                    Ok(receipt)
                }
                Err(cause) => {
                    record_error(&cause);
                    warn!(error = %cause, "Email delivery failed");
                    Err(NotifyError::SendFailed { provider, cause })
                }
            }
        }
        .instrument(span)
        .await
    }

    /// Send a message with one PDF attachment.
    pub async fn send_email_with_attachment(
        &self,
        to: impl Into<Recipients>,
        subject: impl Into<String>,
        html: impl Into<String>,
        attachment: &[u8],
        filename: impl Into<String>,
    ) -> Result<SendReceipt> {
        let message =
            EmailMessage::new(to, subject, html).attach(Attachment::pdf(filename, attachment));
        self.send_email(message).await
    }

    /// Send messages concurrently. Receipts come back in input order; the
    /// first failure aborts the rest and is returned.
    pub async fn send_batch(&self, messages: Vec<EmailMessage>) -> Result<Vec<SendReceipt>> {
        stream::iter(messages)
            .map(|message| self.send_email(message))
            .buffered(self.batch_concurrency)
            .try_collect()
            .await
    }

    /// Send messages concurrently and report every outcome in input order.
    pub async fn send_batch_settled(&self, messages: Vec<EmailMessage>) -> Vec<Result<SendReceipt>> {
        stream::iter(messages)
            .map(|message| self.send_email(message))
            .buffered(self.batch_concurrency)
            .collect()
            .await
    }

    pub fn provider_status(&self) -> ProviderStatus {
        ProviderStatus {
            provider: self.provider.name().to_string(),
            configured: self.provider.is_configured(),
            from_email: self.from_email.clone(),
        }
    }
}

fn validate(message: &EmailMessage) -> Result<()> {
    if message.to.is_empty() {
        return Err(NotifyError::MissingRecipient);
    }

    let fields = [
        ("from", message.from.as_ref().map(|f| Recipients::One(f.clone()))),
        ("to", Some(message.to.clone())),
        ("cc", message.cc.clone()),
        ("bcc", message.bcc.clone()),
    ];
    for (field, recipients) in fields {
        if let Some(bad) = recipients
            .iter()
            .flat_map(Recipients::iter)
            .find(|addr| !is_valid_email(addr))
        {
            return Err(NotifyError::InvalidAddress {
                field,
                address: bad.to_string(),
            });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{DeliveryStatus, MockProvider};

    fn notifier(provider: Arc<MockProvider>) -> Notifier {
        Notifier::new(provider, &EmailConfig::default())
    }

    #[tokio::test]
    async fn test_invalid_recipient_rejected_before_delivery() {
        let provider = Arc::new(MockProvider::recording());
        let err = notifier(provider.clone())
            .send_email(EmailMessage::new("not-an-email", "s", "h"))
            .await
            .unwrap_err();

        assert!(matches!(err, NotifyError::InvalidAddress { field: "to", .. }));
        assert!(err.is_invalid_input());
        assert_eq!(provider.sent_count(), 0);
    }

    #[tokio::test]
    async fn test_invalid_cc_and_sender() {
        let n = notifier(Arc::new(MockProvider::new()));
        let err = n
            .send_email(EmailMessage::new("a@acme.test", "s", "h").cc("nope"))
            .await
            .unwrap_err();
        assert!(matches!(err, NotifyError::InvalidAddress { field: "cc", .. }));

        let err = n
            .send_email(EmailMessage::new("a@acme.test", "s", "h").from("billing"))
            .await
            .unwrap_err();
        assert!(matches!(err, NotifyError::InvalidAddress { field: "from", .. }));
    }

    #[tokio::test]
    async fn test_empty_recipient_list() {
        let err = notifier(Arc::new(MockProvider::new()))
            .send_email(EmailMessage::new(Vec::<String>::new(), "s", "h"))
            .await
            .unwrap_err();
        assert!(matches!(err, NotifyError::MissingRecipient));
    }

    #[tokio::test]
    async fn test_default_sender_filled() {
        let provider = Arc::new(MockProvider::recording());
        notifier(provider.clone())
            .send_email(EmailMessage::new("a@acme.test", "s", "h"))
            .await
            .unwrap();
        assert_eq!(
            provider.sent()[0].from.as_deref(),
            Some(EmailConfig::default().from_email.as_str())
        );
    }

    #[tokio::test]
    async fn test_provider_failure_is_wrapped() {
        let err = notifier(Arc::new(MockProvider::failing("quota exceeded")))
            .send_email(EmailMessage::new("a@acme.test", "s", "h"))
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "Failed to send email: quota exceeded");
        assert!(matches!(err, NotifyError::SendFailed { ref provider, .. } if provider == "mock"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_send_times_out() {
        let provider = Arc::new(MockProvider::new().with_delay(Duration::from_secs(60)));
        let err = notifier(provider)
            .send_email(EmailMessage::new("a@acme.test", "s", "h"))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            NotifyError::SendFailed {
                cause: ProviderError::Timeout(_),
                ..
            }
        ));
    }

    #[tokio::test]
    async fn test_attachment_uses_pdf_content_type() {
        let provider = Arc::new(MockProvider::recording());
        notifier(provider.clone())
            .send_email_with_attachment("a@acme.test", "Invoice", "<p/>", b"%PDF", "INV-1.pdf")
            .await
            .unwrap();
        let sent = provider.sent();
        let attachment = &sent[0].attachments.as_ref().unwrap()[0];
        assert_eq!(attachment.content_type, "application/pdf");
        assert_eq!(attachment.filename, "INV-1.pdf");
    }

    #[tokio::test]
    async fn test_batch_keeps_order() {
        let provider = Arc::new(MockProvider::recording());
        let messages = (0..3)
            .map(|i| EmailMessage::new(format!("user{i}@acme.test"), format!("#{i}"), "h"))
            .collect();

        let receipts = notifier(provider.clone()).send_batch(messages).await.unwrap();
        assert_eq!(receipts.len(), 3);
        assert!(receipts.iter().all(|r| !r.message_id.is_empty()));
        assert!(receipts.iter().all(|r| r.status == DeliveryStatus::Sent));
        let subjects: Vec<_> = provider.sent().into_iter().map(|m| m.subject).collect();
        assert_eq!(subjects, vec!["#0", "#1", "#2"]);
    }

    #[tokio::test]
    async fn test_batch_surfaces_first_failure() {
        let messages = vec![
            EmailMessage::new("a@acme.test", "ok", "h"),
            EmailMessage::new("broken", "bad", "h"),
            EmailMessage::new("c@acme.test", "ok", "h"),
        ];
        let err = notifier(Arc::new(MockProvider::new()))
            .send_batch(messages)
            .await
            .unwrap_err();
        assert!(matches!(err, NotifyError::InvalidAddress { .. }));
    }

    #[tokio::test]
    async fn test_batch_settled_reports_every_outcome() {
        let messages = vec![
            EmailMessage::new("a@acme.test", "ok", "h"),
            EmailMessage::new("broken", "bad", "h"),
            EmailMessage::new("c@acme.test", "ok", "h"),
        ];
        let results = notifier(Arc::new(MockProvider::new()))
            .send_batch_settled(messages)
            .await;
        assert_eq!(results.len(), 3);
        assert!(results[0].is_ok());
        assert!(results[1].is_err());
        assert!(results[2].is_ok());
    }

    #[test]
    fn test_provider_status() {
        let status = notifier(Arc::new(MockProvider::new())).provider_status();
        assert_eq!(status.provider, "mock");
        assert!(status.configured);
        let json = serde_json::to_value(&status).unwrap();
        assert_eq!(json["fromEmail"], "noreply@invoicely.app");
    }
}
