//! Activity log filtering and paging.

use crate::{ActivityLog, ActivitySeverity};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Upper bound on page size.
pub const MAX_PER_PAGE: u32 = 100;

fn default_page() -> u32 {
    1
}

fn default_per_page() -> u32 {
    20
}

/// Filter plus paging for reading the journal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivityQuery {
    #[serde(default)]
    pub user_id: Option<Uuid>,
    /// Exact action match.
    #[serde(default)]
    pub action: Option<String>,
    /// Exact resource match.
    #[serde(default)]
    pub resource: Option<String>,
    /// Entries below this severity are skipped.
    #[serde(default)]
    pub min_severity: Option<ActivitySeverity>,
    /// Case-insensitive substring over email, action, resource and details.
    #[serde(default)]
    pub search: Option<String>,
    #[serde(default)]
    pub from: Option<DateTime<Utc>>,
    #[serde(default)]
    pub to: Option<DateTime<Utc>>,
    #[serde(default = "default_page")]
    pub page: u32,
    #[serde(default = "default_per_page")]
    pub per_page: u32,
}

impl Default for ActivityQuery {
    fn default() -> Self {
        Self {
            user_id: None,
            action: None,
            resource: None,
            min_severity: None,
            search: None,
            from: None,
            to: None,
            page: default_page(),
            per_page: default_per_page(),
        }
    }
}

impl ActivityQuery {
    /// Whether a record passes every filter.
    pub fn matches(&self, log: &ActivityLog) -> bool {
        if self.user_id.is_some_and(|id| id != log.user_id) {
            return false;
        }
        if self.action.as_deref().is_some_and(|a| a != log.action) {
            return false;
        }
        if self.resource.as_deref().is_some_and(|r| r != log.resource) {
            return false;
        }
        if self
            .min_severity
            .is_some_and(|min| !log.effective_severity().meets_threshold(min))
        {
            return false;
        }
        if self.from.is_some_and(|from| log.created_at < from) {
            return false;
        }
        if self.to.is_some_and(|to| log.created_at > to) {
            return false;
        }
        match self.search.as_deref().map(str::trim) {
            Some(needle) if !needle.is_empty() => {
                let needle = needle.to_lowercase();
                [
                    Some(log.user_email.as_str()),
                    Some(log.action.as_str()),
                    Some(log.resource.as_str()),
                    log.details.as_deref(),
                ]
                .into_iter()
                .flatten()
                .any(|field| field.to_lowercase().contains(&needle))
            }
            _ => true,
        }
    }

    /// Page number clamped to at least 1.
    pub fn page(&self) -> u32 {
        self.page.max(1)
    }

    /// Page size clamped to `1..=MAX_PER_PAGE`.
    pub fn per_page(&self) -> u32 {
        self.per_page.clamp(1, MAX_PER_PAGE)
    }

    /// Items to skip.
    pub fn offset(&self) -> usize {
        (self.page() as usize - 1) * self.per_page() as usize
    }
}

/// One page of results.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ActivityPage {
    pub items: Vec<ActivityLog>,
    pub page: u32,
    pub per_page: u32,
    pub total: u64,
}
