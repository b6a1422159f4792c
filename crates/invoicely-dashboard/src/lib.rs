//! Dashboard aggregation contracts for Invoicely.
//!
//! Each role gets a fixed, read-only response shape computed fresh per
//! request from aggregates supplied by a [`DashboardSource`]:
//!
//! - [`UserDashboardResponse`] for invoice owners
//! - [`AdminDashboardResponse`] for tenant administrators
//! - [`SuperAdminDashboardResponse`] for platform operators
//!
//! ```
//! use invoicely_dashboard::{DashboardStats, StatFormat, Trend};
//!
//! let stat = DashboardStats::compare("Revenue", 1200.0, 1000.0, StatFormat::Currency);
//! assert_eq!(stat.change, 200.0);
//! assert_eq!(stat.change_percent, 20.0);
//! assert_eq!(stat.trend, Trend::Up);
//! ```

mod contracts;
mod service;
mod source;
mod stats;

pub use contracts::{
    AdminDashboardResponse, ClientRow, DashboardResponse, InvoiceRow, InvoiceStatus,
    SuperAdminDashboardResponse, TenantRow, TicketPriority, TicketRow, UserDashboardResponse,
    UserRow,
};
pub use service::{DashboardError, DashboardRole, DashboardService, RECENT_ACTIVITY_LIMIT};
pub use source::{
    DashboardSource, InMemorySource, MetricPair, PlatformAggregates, TenantAggregates,
    UserAggregates,
};
pub use stats::{ChartData, DashboardStats, StatFormat, Trend};

/// Result alias for dashboard operations.
pub type Result<T> = std::result::Result<T, DashboardError>;
