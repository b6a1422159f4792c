//! Role-shaped dashboards.

use crate::error::ApiResult;
use crate::middleware::{AdminAuth, Auth, SuperAdminAuth};
use crate::state::AppState;
use axum::{extract::State, Json};
use invoicely_common_log::spans::dashboard_span;
use invoicely_dashboard::{
    AdminDashboardResponse, DashboardResponse, SuperAdminDashboardResponse, UserDashboardResponse,
};
use tracing::Instrument;

/// The dashboard for the caller's highest role.
pub async fn dashboard(
    State(state): State<AppState>,
    Auth(user): Auth,
) -> ApiResult<Json<DashboardResponse>> {
    let role = user.dashboard_role();
    let response = state
        .dashboard
        .for_role(role, user.id)
        .instrument(dashboard_span(&role.to_string()))
        .await?;
    Ok(Json(response))
}

pub async fn user_dashboard(
    State(state): State<AppState>,
    Auth(user): Auth,
) -> ApiResult<Json<UserDashboardResponse>> {
    let response = state
        .dashboard
        .for_user(user.id)
        .instrument(dashboard_span("user"))
        .await?;
    Ok(Json(response))
}

pub async fn admin_dashboard(
    State(state): State<AppState>,
    AdminAuth(user): AdminAuth,
) -> ApiResult<Json<AdminDashboardResponse>> {
    let response = state
        .dashboard
        .for_admin(user.id)
        .instrument(dashboard_span("admin"))
        .await?;
    Ok(Json(response))
}

pub async fn super_admin_dashboard(
    State(state): State<AppState>,
    SuperAdminAuth(_user): SuperAdminAuth,
) -> ApiResult<Json<SuperAdminDashboardResponse>> {
    let response = state
        .dashboard
        .for_super_admin()
        .instrument(dashboard_span("super_admin"))
        .await?;
    Ok(Json(response))
}
