//! The activity log record.

use crate::{ActivityLogId, ActivitySeverity};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// One audit record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivityLog {
    pub id: ActivityLogId,
    pub user_id: Uuid,
    pub user_email: String,
    /// What happened, e.g. `"invoice.create"` or `"upload"`.
    pub action: String,
    /// What it happened to, e.g. `"invoice"`.
    pub resource: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ip_address: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub severity: Option<ActivitySeverity>,
    pub created_at: DateTime<Utc>,
}

impl ActivityLog {
    /// Start building a record.
    pub fn builder(
        user_id: Uuid,
        user_email: impl Into<String>,
        action: impl Into<String>,
        resource: impl Into<String>,
    ) -> ActivityLogBuilder {
        ActivityLogBuilder {
            user_id,
            user_email: user_email.into(),
            action: action.into(),
            resource: resource.into(),
            details: None,
            ip_address: None,
            severity: None,
            created_at: None,
        }
    }

    /// Severity, treating an absent value as informational.
    pub fn effective_severity(&self) -> ActivitySeverity {
        self.severity.unwrap_or_default()
    }
}

/// Builder for [`ActivityLog`].
#[derive(Debug)]
pub struct ActivityLogBuilder {
    user_id: Uuid,
    user_email: String,
    action: String,
    resource: String,
    details: Option<String>,
    ip_address: Option<String>,
    severity: Option<ActivitySeverity>,
    created_at: Option<DateTime<Utc>>,
}

impl ActivityLogBuilder {
    pub fn details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }

    pub fn ip_address(mut self, ip: impl Into<String>) -> Self {
        self.ip_address = Some(ip.into());
        self
    }

    pub fn severity(mut self, severity: ActivitySeverity) -> Self {
        self.severity = Some(severity);
        self
    }

    /// Override the timestamp (imports, fixtures).
    pub fn created_at(mut self, at: DateTime<Utc>) -> Self {
        self.created_at = Some(at);
        self
    }

    pub fn build(self) -> ActivityLog {
        ActivityLog {
            id: ActivityLogId::new(),
            user_id: self.user_id,
            user_email: self.user_email,
            action: self.action,
            resource: self.resource,
            details: self.details,
            ip_address: self.ip_address,
            severity: self.severity,
            created_at: self.created_at.unwrap_or_else(Utc::now),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_and_wire_shape() {
        let log = ActivityLog::builder(Uuid::nil(), "ops@acme.test", "invoice.create", "invoice")
            .details("INV-0042")
            .severity(ActivitySeverity::Warning)
            .build();

        let json = serde_json::to_value(&log).unwrap();
        assert_eq!(json["userEmail"], "ops@acme.test");
        assert_eq!(json["action"], "invoice.create");
        assert_eq!(json["severity"], "warning");
        assert!(json.get("ipAddress").is_none());
        assert!(json.get("createdAt").is_some());
    }

    #[test]
    fn test_missing_severity_is_info() {
        let log = ActivityLog::builder(Uuid::nil(), "a@b.co", "login", "session").build();
        assert_eq!(log.severity, None);
        assert_eq!(log.effective_severity(), ActivitySeverity::Info);
    }
}
