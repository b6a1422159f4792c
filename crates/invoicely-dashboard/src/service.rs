//! Builds role-keyed dashboard responses from aggregates.

use crate::{
    AdminDashboardResponse, ChartData, DashboardResponse, DashboardSource, DashboardStats,
    InvoiceStatus, Result, StatFormat, SuperAdminDashboardResponse, UserDashboardResponse,
};
use invoicely_activity_types::{ActivityJournal, ActivityQuery};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use strum::{Display, EnumString};
use thiserror::Error;
use tracing::debug;
use uuid::Uuid;

/// Entries shown in the admin activity feed.
pub const RECENT_ACTIVITY_LIMIT: u32 = 10;

#[derive(Debug, Error)]
pub enum DashboardError {
    #[error("dashboard source unavailable: {0}")]
    SourceUnavailable(String),
}

/// Which dashboard a caller gets.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Display,
    EnumString,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum DashboardRole {
    User,
    Admin,
    SuperAdmin,
}

impl DashboardRole {
    /// Highest dashboard role among role names. Unknown names are ignored.
    pub fn highest<S: AsRef<str>>(roles: &[S]) -> Self {
        roles
            .iter()
            .filter_map(|r| r.as_ref().parse::<Self>().ok())
            .max()
            .unwrap_or(Self::User)
    }
}

/// Computes dashboard responses. Nothing is cached or persisted here.
#[derive(Clone)]
pub struct DashboardService {
    source: Arc<dyn DashboardSource>,
    journal: Arc<dyn ActivityJournal>,
}

impl DashboardService {
    pub fn new(source: Arc<dyn DashboardSource>, journal: Arc<dyn ActivityJournal>) -> Self {
        Self { source, journal }
    }

    /// Same source, reading recent activity from `journal`.
    pub fn with_journal(&self, journal: Arc<dyn ActivityJournal>) -> Self {
        Self {
            source: self.source.clone(),
            journal,
        }
    }

    pub async fn for_user(&self, user_id: Uuid) -> Result<UserDashboardResponse> {
        let agg = self.source.user_aggregates(user_id).await?;
        debug!(%user_id, invoices = agg.recent_invoices.len(), "Built user dashboard");

        Ok(UserDashboardResponse {
            stats: vec![
                DashboardStats::compare(
                    "Total Revenue",
                    agg.revenue.current,
                    agg.revenue.previous,
                    StatFormat::Currency,
                ),
                DashboardStats::compare(
                    "Invoices Issued",
                    agg.invoices_issued.current,
                    agg.invoices_issued.previous,
                    StatFormat::Count,
                ),
                DashboardStats::compare(
                    "Outstanding",
                    agg.outstanding.current,
                    agg.outstanding.previous,
                    StatFormat::Currency,
                ),
                DashboardStats::compare(
                    "Active Clients",
                    agg.active_clients.current,
                    agg.active_clients.previous,
                    StatFormat::Count,
                ),
            ],
            revenue_chart: ChartData::series(agg.monthly_revenue),
            invoice_status_chart: status_chart(&agg.status_counts),
            recent_invoices: agg.recent_invoices,
            top_clients: agg.top_clients,
        })
    }

    pub async fn for_admin(&self, admin_id: Uuid) -> Result<AdminDashboardResponse> {
        let agg = self.source.tenant_aggregates(admin_id).await?;
        let recent = self
            .journal
            .query(&ActivityQuery {
                per_page: RECENT_ACTIVITY_LIMIT,
                ..Default::default()
            })
            .await;
        debug!(%admin_id, users = agg.users.len(), activity = recent.items.len(), "Built admin dashboard");

        Ok(AdminDashboardResponse {
            stats: vec![
                DashboardStats::compare(
                    "Tenant Revenue",
                    agg.revenue.current,
                    agg.revenue.previous,
                    StatFormat::Currency,
                ),
                DashboardStats::compare(
                    "Active Users",
                    agg.active_users.current,
                    agg.active_users.previous,
                    StatFormat::Count,
                ),
                DashboardStats::compare(
                    "Invoices Issued",
                    agg.invoices_issued.current,
                    agg.invoices_issued.previous,
                    StatFormat::Count,
                ),
                DashboardStats::compare(
                    "Overdue Invoices",
                    agg.overdue_invoices.current,
                    agg.overdue_invoices.previous,
                    StatFormat::Count,
                ),
            ],
            revenue_by_user_chart: ChartData::series(agg.revenue_by_user),
            invoice_status_chart: status_chart(&agg.status_counts),
            users: agg.users,
            recent_activity: recent.items,
        })
    }

    pub async fn for_super_admin(&self) -> Result<SuperAdminDashboardResponse> {
        let agg = self.source.platform_aggregates().await?;
        debug!(tenants = agg.tenant_rows.len(), "Built super admin dashboard");

        Ok(SuperAdminDashboardResponse {
            stats: vec![
                DashboardStats::compare(
                    "Monthly Recurring Revenue",
                    agg.monthly_recurring_revenue.current,
                    agg.monthly_recurring_revenue.previous,
                    StatFormat::Currency,
                ),
                DashboardStats::compare(
                    "Tenants",
                    agg.tenants.current,
                    agg.tenants.previous,
                    StatFormat::Count,
                ),
                DashboardStats::compare(
                    "Active Users",
                    agg.active_users.current,
                    agg.active_users.previous,
                    StatFormat::Count,
                ),
                DashboardStats::compare(
                    "Open Tickets",
                    agg.open_tickets.current,
                    agg.open_tickets.previous,
                    StatFormat::Count,
                ),
            ],
            tenant_growth_chart: ChartData::series(agg.tenant_growth),
            plan_distribution_chart: ChartData::series(agg.plan_distribution),
            tenants: agg.tenant_rows,
            open_tickets: agg.ticket_rows,
        })
    }

    /// Shape selected by role. `user_id` is ignored for super admins.
    pub async fn for_role(&self, role: DashboardRole, user_id: Uuid) -> Result<DashboardResponse> {
        Ok(match role {
            DashboardRole::User => DashboardResponse::User(self.for_user(user_id).await?),
            DashboardRole::Admin => DashboardResponse::Admin(self.for_admin(user_id).await?),
            DashboardRole::SuperAdmin => {
                DashboardResponse::SuperAdmin(self.for_super_admin().await?)
            }
        })
    }
}

fn status_chart(counts: &[(InvoiceStatus, u64)]) -> Vec<ChartData> {
    counts
        .iter()
        .map(|(status, count)| {
            ChartData::new(status.to_string(), *count as f64).with_color(status.color())
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{InMemorySource, MetricPair, UserAggregates};
    use invoicely_activity_types::{ActivityLog, InMemoryJournal};

    fn service(source: InMemorySource, journal: InMemoryJournal) -> DashboardService {
        DashboardService::new(Arc::new(source), Arc::new(journal))
    }

    #[test]
    fn test_highest_role() {
        assert_eq!(DashboardRole::highest(&["user", "admin"]), DashboardRole::Admin);
        assert_eq!(
            DashboardRole::highest(&["super_admin", "user"]),
            DashboardRole::SuperAdmin
        );
        assert_eq!(DashboardRole::highest::<&str>(&[]), DashboardRole::User);
        assert_eq!(DashboardRole::highest(&["auditor"]), DashboardRole::User);
    }

    #[tokio::test]
    async fn test_user_dashboard_stats_and_charts() {
        let source = InMemorySource::new();
        let user = Uuid::new_v4();
        source.set_user(
            user,
            UserAggregates {
                revenue: MetricPair::new(150.0, 100.0),
                monthly_revenue: vec![("Sep".into(), -20.0), ("Oct".into(), 150.0)],
                status_counts: vec![(InvoiceStatus::Paid, 2)],
                ..Default::default()
            },
        );

        let dashboard = service(source, InMemoryJournal::new())
            .for_user(user)
            .await
            .unwrap();
        assert_eq!(dashboard.stats[0].change_percent, 50.0);
        assert_eq!(dashboard.revenue_chart[0].value, 0.0);
        assert_eq!(dashboard.invoice_status_chart[0].label, "paid");
        assert_eq!(
            dashboard.invoice_status_chart[0].color.as_deref(),
            Some(InvoiceStatus::Paid.color())
        );
    }

    #[tokio::test]
    async fn test_admin_dashboard_pulls_recent_activity() {
        let journal = InMemoryJournal::new();
        for i in 0..15 {
            journal
                .record(
                    ActivityLog::builder(Uuid::nil(), "a@acme.test", format!("act.{i}"), "invoice")
                        .build(),
                )
                .await;
        }

        let dashboard = service(InMemorySource::with_sample_data(), journal)
            .for_admin(Uuid::new_v4())
            .await
            .unwrap();
        assert_eq!(dashboard.recent_activity.len(), RECENT_ACTIVITY_LIMIT as usize);
        assert_eq!(dashboard.users.len(), 3);
    }

    #[tokio::test]
    async fn test_for_role_selects_shape() {
        let svc = service(InMemorySource::with_sample_data(), InMemoryJournal::new());
        let user = Uuid::new_v4();

        for role in [DashboardRole::User, DashboardRole::Admin, DashboardRole::SuperAdmin] {
            let response = svc.for_role(role, user).await.unwrap();
            let json = serde_json::to_value(&response).unwrap();
            assert_eq!(json["role"], role.to_string());
            assert_eq!(response.stats().len(), 4);
        }
    }
}
