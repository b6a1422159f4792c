//! Activity log types for Invoicely.
//!
//! Activity logs are an append-only audit trail. Write paths call
//! [`ActivityJournal::record`]; everything else only reads through
//! [`ActivityJournal::query`].

mod id;
mod journal;
mod log;
mod query;
mod severity;

pub use id::ActivityLogId;
pub use journal::{ActivityJournal, InMemoryJournal};
pub use log::{ActivityLog, ActivityLogBuilder};
pub use query::{ActivityPage, ActivityQuery, MAX_PER_PAGE};
pub use severity::ActivitySeverity;
