//! Span helpers used across the server and the notification sender.

use tracing::{info_span, Span};

/// Span for one outbound email delivery attempt.
pub fn delivery_span(provider: &str, recipients: usize) -> Span {
    info_span!(
        "email.delivery",
        provider = %provider,
        recipients = recipients,
        message_id = tracing::field::Empty,
        error = tracing::field::Empty,
    )
}

/// Span for an upload being accepted.
pub fn upload_span(kind: &str, filename: &str) -> Span {
    info_span!("upload", kind = %kind, original = %filename, stored = tracing::field::Empty)
}

/// Span for a dashboard aggregation.
pub fn dashboard_span(role: &str) -> Span {
    info_span!("dashboard", role = %role)
}

/// Record an error on the current span.
///
/// Only spans declaring an `error` field, such as [`delivery_span`], keep it.
pub fn record_error(error: &dyn std::error::Error) {
    Span::current().record("error", tracing::field::display(error));
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fmt;
    use std::io;
    use std::sync::{Arc, Mutex};
    use tracing::field::{Field, Visit};
    use tracing::{span, Subscriber};
    use tracing_subscriber::layer::{Context, SubscriberExt};
    use tracing_subscriber::{EnvFilter, Layer, Registry};

    fn with_subscriber<F: FnOnce()>(f: F) {
        let subscriber = tracing_subscriber::fmt()
            .with_test_writer()
            .with_env_filter(EnvFilter::new("trace"))
            .finish();

        tracing::subscriber::with_default(subscriber, f);
    }

    #[test]
    fn test_nested_spans() {
        with_subscriber(|| {
            let upload = upload_span("logo", "photo.png");
            let _outer = upload.enter();
            upload.record("stored", "logo-1-2.png");

            let delivery = delivery_span("mock", 3);
            let _inner = delivery.enter();
            tracing::info!("nested operation");
        });
    }

    struct Recorded(Arc<Mutex<Vec<String>>>);

    impl<S: Subscriber> Layer<S> for Recorded {
        fn on_record(&self, _id: &span::Id, values: &span::Record<'_>, _ctx: Context<'_, S>) {
            values.record(&mut FieldLog(&self.0));
        }
    }

    struct FieldLog<'a>(&'a Mutex<Vec<String>>);

    impl Visit for FieldLog<'_> {
        fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
            self.0.lock().unwrap().push(format!("{}={:?}", field.name(), value));
        }
    }

    #[test]
    fn test_record_error_lands_on_delivery_span() {
        let recorded = Arc::new(Mutex::new(Vec::new()));
        let subscriber = Registry::default().with(Recorded(recorded.clone()));

        tracing::subscriber::with_default(subscriber, || {
            let delivery = delivery_span("mock", 1);
            let _entered = delivery.enter();
            record_error(&io::Error::new(io::ErrorKind::Other, "mailbox full"));
        });

        assert_eq!(*recorded.lock().unwrap(), vec!["error=mailbox full".to_string()]);
    }
}
