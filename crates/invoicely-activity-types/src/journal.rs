//! Append-only activity journal.

use crate::{ActivityLog, ActivityPage, ActivityQuery};
use async_trait::async_trait;
use parking_lot::RwLock;

/// Storage for activity logs. Entries are never updated or removed.
#[async_trait]
pub trait ActivityJournal: Send + Sync {
    /// Append a record.
    async fn record(&self, log: ActivityLog);

    /// Read matching records, newest first.
    async fn query(&self, query: &ActivityQuery) -> ActivityPage;
}

/// Journal kept in process memory.
#[derive(Debug, Default)]
pub struct InMemoryJournal {
    entries: RwLock<Vec<ActivityLog>>,
}

impl InMemoryJournal {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed with existing records.
    pub fn with_entries(entries: Vec<ActivityLog>) -> Self {
        Self {
            entries: RwLock::new(entries),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }
}

#[async_trait]
impl ActivityJournal for InMemoryJournal {
    async fn record(&self, log: ActivityLog) {
        self.entries.write().push(log);
    }

    async fn query(&self, query: &ActivityQuery) -> ActivityPage {
        let entries = self.entries.read();
        let mut matching: Vec<&ActivityLog> = entries.iter().filter(|l| query.matches(l)).collect();
        // Stable sort keeps insertion order for identical timestamps, newest insert first.
        matching.reverse();
        matching.sort_by(|a, b| b.created_at.cmp(&a.created_at));

        let total = matching.len() as u64;
        let items = matching
            .into_iter()
            .skip(query.offset())
            .take(query.per_page() as usize)
            .cloned()
            .collect();

        ActivityPage {
            items,
            page: query.page(),
            per_page: query.per_page(),
            total,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ActivitySeverity;
    use chrono::{Duration, Utc};
    use uuid::Uuid;

    fn entry(action: &str, minutes_ago: i64) -> ActivityLog {
        ActivityLog::builder(Uuid::nil(), "ops@acme.test", action, "invoice")
            .created_at(Utc::now() - Duration::minutes(minutes_ago))
            .build()
    }

    #[tokio::test]
    async fn test_newest_first_with_paging() {
        let journal = InMemoryJournal::with_entries(vec![
            entry("oldest", 30),
            entry("newest", 1),
            entry("middle", 10),
        ]);

        let first = journal
            .query(&ActivityQuery {
                per_page: 2,
                ..Default::default()
            })
            .await;
        assert_eq!(first.total, 3);
        let actions: Vec<_> = first.items.iter().map(|l| l.action.as_str()).collect();
        assert_eq!(actions, vec!["newest", "middle"]);

        let second = journal
            .query(&ActivityQuery {
                page: 2,
                per_page: 2,
                ..Default::default()
            })
            .await;
        assert_eq!(second.items.len(), 1);
        assert_eq!(second.items[0].action, "oldest");
    }

    #[tokio::test]
    async fn test_record_appends_and_filters_apply() {
        let journal = InMemoryJournal::new();
        journal.record(entry("invoice.create", 2)).await;
        journal
            .record(
                ActivityLog::builder(Uuid::nil(), "ops@acme.test", "login.failed", "session")
                    .severity(ActivitySeverity::Warning)
                    .build(),
            )
            .await;
        assert_eq!(journal.len(), 2);

        let page = journal
            .query(&ActivityQuery {
                min_severity: Some(ActivitySeverity::Warning),
                ..Default::default()
            })
            .await;
        assert_eq!(page.total, 1);
        assert_eq!(page.items[0].resource, "session");
    }

    proptest::proptest! {
        #[test]
        fn prop_pages_cover_every_entry_once(count in 0usize..60, per_page in 1u32..15) {
            let entries: Vec<_> = (0..count).map(|i| entry(&format!("a{i}"), i as i64)).collect();
            let journal = InMemoryJournal::with_entries(entries);
            let rt = tokio::runtime::Builder::new_current_thread().build().unwrap();

            let mut seen = Vec::new();
            let mut page = 1;
            loop {
                let result = rt.block_on(journal.query(&ActivityQuery {
                    page,
                    per_page,
                    ..Default::default()
                }));
                proptest::prop_assert_eq!(result.total, count as u64);
                if result.items.is_empty() {
                    break;
                }
                seen.extend(result.items.into_iter().map(|l| l.action));
                page += 1;
            }

            let expected: Vec<_> = (0..count).map(|i| format!("a{i}")).collect();
            proptest::prop_assert_eq!(seen, expected);
        }
    }
}
