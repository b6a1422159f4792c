//! Response shapes returned per role.

use crate::{ChartData, DashboardStats};
use chrono::{DateTime, NaiveDate, Utc};
use invoicely_activity_types::ActivityLog;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter};
use uuid::Uuid;

/// Lifecycle state of an invoice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumIter)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum InvoiceStatus {
    Draft,
    Sent,
    Paid,
    Overdue,
    Cancelled,
}

impl InvoiceStatus {
    /// Chart color for the status slice.
    pub fn color(&self) -> &'static str {
        match self {
            Self::Draft => "#94a3b8",
            Self::Sent => "#3b82f6",
            Self::Paid => "#22c55e",
            Self::Overdue => "#ef4444",
            Self::Cancelled => "#64748b",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InvoiceRow {
    pub id: Uuid,
    pub number: String,
    pub client_name: String,
    pub amount: f64,
    pub status: InvoiceStatus,
    pub due_date: NaiveDate,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientRow {
    pub id: Uuid,
    pub name: String,
    pub total_billed: f64,
    pub invoice_count: u64,
}

/// A member of a tenant, as seen by its administrator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserRow {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub role: String,
    pub invoice_count: u64,
    pub revenue: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_active_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TenantRow {
    pub id: Uuid,
    pub name: String,
    pub plan: String,
    pub user_count: u64,
    pub monthly_revenue: f64,
    pub active: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TicketPriority {
    Low,
    Medium,
    High,
    Urgent,
}

/// An open support ticket.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TicketRow {
    pub id: Uuid,
    pub subject: String,
    pub tenant_name: String,
    pub priority: TicketPriority,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserDashboardResponse {
    pub stats: Vec<DashboardStats>,
    pub revenue_chart: Vec<ChartData>,
    pub invoice_status_chart: Vec<ChartData>,
    pub recent_invoices: Vec<InvoiceRow>,
    pub top_clients: Vec<ClientRow>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminDashboardResponse {
    pub stats: Vec<DashboardStats>,
    pub revenue_by_user_chart: Vec<ChartData>,
    pub invoice_status_chart: Vec<ChartData>,
    pub users: Vec<UserRow>,
    pub recent_activity: Vec<ActivityLog>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SuperAdminDashboardResponse {
    pub stats: Vec<DashboardStats>,
    pub tenant_growth_chart: Vec<ChartData>,
    pub plan_distribution_chart: Vec<ChartData>,
    pub tenants: Vec<TenantRow>,
    pub open_tickets: Vec<TicketRow>,
}

/// Any of the three shapes, tagged with the role it was built for.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "role", rename_all = "snake_case")]
pub enum DashboardResponse {
    User(UserDashboardResponse),
    Admin(AdminDashboardResponse),
    SuperAdmin(SuperAdminDashboardResponse),
}

impl DashboardResponse {
    /// Stat cards regardless of shape.
    pub fn stats(&self) -> &[DashboardStats] {
        match self {
            Self::User(r) => &r.stats,
            Self::Admin(r) => &r.stats,
            Self::SuperAdmin(r) => &r.stats,
        }
    }

    /// Every chart series regardless of shape.
    pub fn charts(&self) -> Vec<&[ChartData]> {
        match self {
            Self::User(r) => vec![&r.revenue_chart, &r.invoice_status_chart],
            Self::Admin(r) => vec![&r.revenue_by_user_chart, &r.invoice_status_chart],
            Self::SuperAdmin(r) => vec![&r.tenant_growth_chart, &r.plan_distribution_chart],
        }
    }
}
