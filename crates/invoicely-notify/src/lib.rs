//! Outbound email for Invoicely.
//!
//! A single [`EmailProvider`] is chosen from [`EmailConfig`] at startup and
//! wrapped by a [`Notifier`], which fills defaults, validates addresses,
//! applies timeouts and fans out batches.

mod config;
mod message;
mod mock;
mod notifier;
mod provider;
mod resend;
mod sendgrid;
mod validate;

pub use config::{build_provider, EmailConfig, ProviderKind};
pub use message::{Attachment, EmailMessage, Recipients, PDF_CONTENT_TYPE};
pub use mock::MockProvider;
pub use notifier::{Notifier, NotifyError, ProviderStatus};
pub use provider::{DeliveryStatus, EmailProvider, ProviderError, SendReceipt};
pub use resend::ResendProvider;
pub use sendgrid::SendGridProvider;
pub use validate::is_valid_email;

/// Result alias for notifier operations.
pub type Result<T> = std::result::Result<T, NotifyError>;
