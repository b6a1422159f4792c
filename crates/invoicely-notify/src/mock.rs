use crate::provider::*;
use crate::EmailMessage;
use parking_lot::Mutex;
use std::time::Duration;
use uuid::Uuid;

/// Provider that accepts messages without delivering them.
///
/// Only a provider built with [`MockProvider::recording`] keeps the
/// accepted messages around for inspection.
#[derive(Debug, Default)]
pub struct MockProvider {
    fail_with: Option<String>,
    delay: Option<Duration>,
    sent: Option<Mutex<Vec<EmailMessage>>>,
}

impl MockProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Keep every accepted message, see [`MockProvider::sent`].
    pub fn recording() -> Self {
        Self {
            sent: Some(Mutex::new(Vec::new())),
            ..Self::default()
        }
    }

    /// Every send fails with `reason`.
    pub fn failing(reason: impl Into<String>) -> Self {
        Self {
            fail_with: Some(reason.into()),
            ..Self::default()
        }
    }

    /// Sleep before answering.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Messages accepted so far, in send order. Empty unless recording.
    pub fn sent(&self) -> Vec<EmailMessage> {
        self.sent
            .as_ref()
            .map(|sent| sent.lock().clone())
            .unwrap_or_default()
    }

    pub fn sent_count(&self) -> usize {
        self.sent.as_ref().map_or(0, |sent| sent.lock().len())
    }
}

#[async_trait::async_trait]
impl EmailProvider for MockProvider {
    fn name(&self) -> &str {
        "mock"
    }

    fn is_configured(&self) -> bool {
        true
    }

    async fn send(&self, message: &EmailMessage) -> Result<SendReceipt, ProviderError> {
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        if let Some(reason) = &self.fail_with {
            return Err(ProviderError::Rejected(reason.clone()));
        }

        let message_id = format!("mock-{}", Uuid::new_v4());
        tracing::info!(
            message_id = %message_id,
            to = ?message.to.to_vec(),
            subject = %message.subject,
            "Mock email accepted"
        );
        if let Some(sent) = &self.sent {
            sent.lock().push(message.clone());
        }

        Ok(SendReceipt {
            message_id,
            status: DeliveryStatus::Sent,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_records_messages() {
        let provider = MockProvider::recording();
        let receipt = provider
            .send(&EmailMessage::new("a@acme.test", "s", "h"))
            .await
            .unwrap();
        assert!(receipt.message_id.starts_with("mock-"));
        assert_eq!(receipt.status, DeliveryStatus::Sent);
        assert_eq!(provider.sent_count(), 1);
    }

    #[tokio::test]
    async fn test_default_provider_keeps_nothing() {
        let provider = MockProvider::new();
        for i in 0..3 {
            let receipt = provider
                .send(&EmailMessage::new("a@acme.test", format!("#{i}"), "h"))
                .await
                .unwrap();
            assert_eq!(receipt.status, DeliveryStatus::Sent);
        }
        assert_eq!(provider.sent_count(), 0);
        assert!(provider.sent().is_empty());
    }

    #[tokio::test]
    async fn test_failing() {
        let provider = MockProvider::failing("mailbox full");
        let err = provider
            .send(&EmailMessage::new("a@acme.test", "s", "h"))
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "mailbox full");
        assert_eq!(provider.sent_count(), 0);
    }
}
