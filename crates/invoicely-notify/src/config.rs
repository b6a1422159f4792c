use crate::provider::{EmailProvider, ProviderError};
use crate::resend::RESEND_API_BASE;
use crate::sendgrid::SENDGRID_API_BASE;
use crate::{MockProvider, ResendProvider, SendGridProvider};
use invoicely_common_http::{HttpClient, HttpConfig};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use strum::{Display, EnumString};

/// Which delivery backend to use.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum ProviderKind {
    #[default]
    Mock,
    SendGrid,
    Resend,
}

/// Email settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EmailConfig {
    pub provider: ProviderKind,
    pub from_email: String,
    pub api_key: Option<String>,
    pub sendgrid_base_url: String,
    pub resend_base_url: String,
    /// Per-send timeout.
    pub send_timeout_ms: u64,
    /// Maximum sends in flight during a batch.
    pub batch_concurrency: usize,
}

impl Default for EmailConfig {
    fn default() -> Self {
        Self {
            provider: ProviderKind::Mock,
            from_email: "noreply@invoicely.app".to_string(),
            api_key: None,
            sendgrid_base_url: SENDGRID_API_BASE.to_string(),
            resend_base_url: RESEND_API_BASE.to_string(),
            send_timeout_ms: 10_000,
            batch_concurrency: 5,
        }
    }
}

impl EmailConfig {
    pub fn send_timeout(&self) -> Duration {
        Duration::from_millis(self.send_timeout_ms)
    }
}

/// Build the provider selected by `config`.
///
/// A real provider without an API key is still built; it reports itself as
/// unconfigured and every send fails.
pub fn build_provider(config: &EmailConfig) -> Result<Arc<dyn EmailProvider>, ProviderError> {
    let http = || {
        HttpClient::with_config(HttpConfig {
            request_timeout: config.send_timeout(),
            ..HttpConfig::default()
        })
    };

    let provider: Arc<dyn EmailProvider> = match config.provider {
        ProviderKind::Mock => Arc::new(MockProvider::new()),
        ProviderKind::SendGrid => Arc::new(SendGridProvider::with_base_url(
            http()?,
            config.api_key.clone(),
            &config.sendgrid_base_url,
        )),
        ProviderKind::Resend => Arc::new(ResendProvider::with_base_url(
            http()?,
            config.api_key.clone(),
            &config.resend_base_url,
        )),
    };

    if !provider.is_configured() {
        tracing::warn!(provider = provider.name(), "Email provider has no API key; sends will fail");
    }
    tracing::info!(provider = provider.name(), "Email provider selected");
    Ok(provider)
}
