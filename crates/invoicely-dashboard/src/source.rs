//! Aggregate inputs and the trait that supplies them.

use crate::{
    ClientRow, InvoiceRow, InvoiceStatus, Result, TenantRow, TicketPriority, TicketRow, UserRow,
};
use async_trait::async_trait;
use chrono::{Duration, NaiveDate, Utc};
use parking_lot::RwLock;
use std::collections::HashMap;
use uuid::Uuid;

/// A metric for the current and the previous period.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct MetricPair {
    pub current: f64,
    pub previous: f64,
}

impl MetricPair {
    pub fn new(current: f64, previous: f64) -> Self {
        Self { current, previous }
    }
}

/// Totals for one invoice owner.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UserAggregates {
    pub revenue: MetricPair,
    pub invoices_issued: MetricPair,
    pub outstanding: MetricPair,
    pub active_clients: MetricPair,
    /// `(month label, revenue)` oldest first.
    pub monthly_revenue: Vec<(String, f64)>,
    pub status_counts: Vec<(InvoiceStatus, u64)>,
    pub recent_invoices: Vec<InvoiceRow>,
    pub top_clients: Vec<ClientRow>,
}

/// Totals for the tenant an administrator manages.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TenantAggregates {
    pub revenue: MetricPair,
    pub active_users: MetricPair,
    pub invoices_issued: MetricPair,
    pub overdue_invoices: MetricPair,
    /// `(user name, revenue)`.
    pub revenue_by_user: Vec<(String, f64)>,
    pub status_counts: Vec<(InvoiceStatus, u64)>,
    pub users: Vec<UserRow>,
}

/// Platform-wide totals.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PlatformAggregates {
    pub monthly_recurring_revenue: MetricPair,
    pub tenants: MetricPair,
    pub active_users: MetricPair,
    pub open_tickets: MetricPair,
    /// `(month label, tenant count)` oldest first.
    pub tenant_growth: Vec<(String, f64)>,
    /// `(plan name, tenant count)`.
    pub plan_distribution: Vec<(String, f64)>,
    pub tenant_rows: Vec<TenantRow>,
    pub ticket_rows: Vec<TicketRow>,
}

/// Supplies precomputed aggregates. Implementations read from whatever store
/// holds invoices, clients, tenants and tickets.
#[async_trait]
pub trait DashboardSource: Send + Sync {
    async fn user_aggregates(&self, user_id: Uuid) -> Result<UserAggregates>;

    async fn tenant_aggregates(&self, admin_id: Uuid) -> Result<TenantAggregates>;

    async fn platform_aggregates(&self) -> Result<PlatformAggregates>;
}

/// Source backed by process memory.
///
/// Users without their own entry get the shared fallback aggregates.
#[derive(Debug, Default)]
pub struct InMemorySource {
    users: RwLock<HashMap<Uuid, UserAggregates>>,
    fallback_user: UserAggregates,
    tenant: TenantAggregates,
    platform: PlatformAggregates,
}

impl InMemorySource {
    /// Empty source. Every stat reports zero.
    pub fn new() -> Self {
        Self::default()
    }

    /// Source seeded with demo data.
    pub fn with_sample_data() -> Self {
        Self {
            users: RwLock::new(HashMap::new()),
            fallback_user: sample_user(),
            tenant: sample_tenant(),
            platform: sample_platform(),
        }
    }

    pub fn set_user(&self, user_id: Uuid, aggregates: UserAggregates) {
        self.users.write().insert(user_id, aggregates);
    }

    pub fn with_tenant(mut self, tenant: TenantAggregates) -> Self {
        self.tenant = tenant;
        self
    }

    pub fn with_platform(mut self, platform: PlatformAggregates) -> Self {
        self.platform = platform;
        self
    }
}

#[async_trait]
impl DashboardSource for InMemorySource {
    async fn user_aggregates(&self, user_id: Uuid) -> Result<UserAggregates> {
        Ok(self
            .users
            .read()
            .get(&user_id)
            .cloned()
            .unwrap_or_else(|| self.fallback_user.clone()))
    }

    async fn tenant_aggregates(&self, _admin_id: Uuid) -> Result<TenantAggregates> {
        Ok(self.tenant.clone())
    }

    async fn platform_aggregates(&self) -> Result<PlatformAggregates> {
        Ok(self.platform.clone())
    }
}

const MONTHS: [&str; 6] = ["May", "Jun", "Jul", "Aug", "Sep", "Oct"];

fn sample_user() -> UserAggregates {
    let today = Utc::now().date_naive();
    let due = |days: i64| today + Duration::days(days);
    let client = |name: &str, billed: f64, count: u64| ClientRow {
        id: Uuid::new_v4(),
        name: name.into(),
        total_billed: billed,
        invoice_count: count,
    };

    UserAggregates {
        revenue: MetricPair::new(18_450.0, 15_200.0),
        invoices_issued: MetricPair::new(42.0, 37.0),
        outstanding: MetricPair::new(3_120.0, 4_050.0),
        active_clients: MetricPair::new(12.0, 12.0),
        monthly_revenue: MONTHS
            .iter()
            .zip([11_200.0, 12_900.0, 13_400.0, 14_800.0, 15_200.0, 18_450.0])
            .map(|(m, v)| (m.to_string(), v))
            .collect(),
        status_counts: vec![
            (InvoiceStatus::Paid, 30),
            (InvoiceStatus::Sent, 7),
            (InvoiceStatus::Overdue, 3),
            (InvoiceStatus::Draft, 2),
        ],
        recent_invoices: vec![
            sample_invoice("INV-0042", "Acme Corp", 2_400.0, InvoiceStatus::Sent, due(14)),
            sample_invoice("INV-0041", "Globex", 980.0, InvoiceStatus::Paid, due(-3)),
            sample_invoice("INV-0040", "Initech", 1_150.0, InvoiceStatus::Overdue, due(-10)),
        ],
        top_clients: vec![
            client("Acme Corp", 9_600.0, 8),
            client("Globex", 4_320.0, 6),
            client("Initech", 2_870.0, 4),
        ],
    }
}

fn sample_invoice(
    number: &str,
    client: &str,
    amount: f64,
    status: InvoiceStatus,
    due_date: NaiveDate,
) -> InvoiceRow {
    InvoiceRow {
        id: Uuid::new_v4(),
        number: number.into(),
        client_name: client.into(),
        amount,
        status,
        due_date,
    }
}

fn sample_tenant() -> TenantAggregates {
    let member = |name: &str, email: &str, role: &str, count: u64, revenue: f64| UserRow {
        id: Uuid::new_v4(),
        name: name.into(),
        email: email.into(),
        role: role.into(),
        invoice_count: count,
        revenue,
        last_active_at: Some(Utc::now() - Duration::hours(count as i64)),
    };

    TenantAggregates {
        revenue: MetricPair::new(52_300.0, 47_900.0),
        active_users: MetricPair::new(6.0, 5.0),
        invoices_issued: MetricPair::new(118.0, 121.0),
        overdue_invoices: MetricPair::new(4.0, 9.0),
        revenue_by_user: vec![
            ("Dana Reyes".into(), 21_400.0),
            ("Sam Okafor".into(), 17_800.0),
            ("Lee Park".into(), 13_100.0),
        ],
        status_counts: vec![
            (InvoiceStatus::Paid, 96),
            (InvoiceStatus::Sent, 14),
            (InvoiceStatus::Overdue, 4),
            (InvoiceStatus::Draft, 3),
            (InvoiceStatus::Cancelled, 1),
        ],
        users: vec![
            member("Dana Reyes", "dana@acme.test", "admin", 3, 21_400.0),
            member("Sam Okafor", "sam@acme.test", "user", 5, 17_800.0),
            member("Lee Park", "lee@acme.test", "user", 26, 13_100.0),
        ],
    }
}

fn sample_platform() -> PlatformAggregates {
    let tenant = |name: &str, plan: &str, users: u64, mrr: f64, days: i64| TenantRow {
        id: Uuid::new_v4(),
        name: name.into(),
        plan: plan.into(),
        user_count: users,
        monthly_revenue: mrr,
        active: true,
        created_at: Utc::now() - Duration::days(days),
    };

    PlatformAggregates {
        monthly_recurring_revenue: MetricPair::new(8_940.0, 8_120.0),
        tenants: MetricPair::new(64.0, 58.0),
        active_users: MetricPair::new(412.0, 377.0),
        open_tickets: MetricPair::new(7.0, 11.0),
        tenant_growth: MONTHS
            .iter()
            .zip([31.0, 38.0, 44.0, 51.0, 58.0, 64.0])
            .map(|(m, v)| (m.to_string(), v))
            .collect(),
        plan_distribution: vec![
            ("free".into(), 29.0),
            ("pro".into(), 27.0),
            ("enterprise".into(), 8.0),
        ],
        tenant_rows: vec![
            tenant("Acme Corp", "enterprise", 18, 990.0, 400),
            tenant("Globex", "pro", 6, 149.0, 120),
            tenant("Initech", "free", 2, 0.0, 12),
        ],
        ticket_rows: vec![TicketRow {
            id: Uuid::new_v4(),
            subject: "PDF export cuts off line items".into(),
            tenant_name: "Globex".into(),
            priority: TicketPriority::High,
            created_at: Utc::now() - Duration::hours(5),
        }],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_user_override_and_fallback() {
        let source = InMemorySource::with_sample_data();
        let owner = Uuid::new_v4();
        source.set_user(
            owner,
            UserAggregates {
                revenue: MetricPair::new(1.0, 0.0),
                ..Default::default()
            },
        );

        let own = source.user_aggregates(owner).await.unwrap();
        assert_eq!(own.revenue.current, 1.0);

        let other = source.user_aggregates(Uuid::new_v4()).await.unwrap();
        assert_eq!(other.recent_invoices.len(), 3);
    }

    #[tokio::test]
    async fn test_empty_source() {
        let source = InMemorySource::new();
        let platform = source.platform_aggregates().await.unwrap();
        assert!(platform.tenant_rows.is_empty());
    }
}
