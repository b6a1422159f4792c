//! Activity log listing.

use crate::middleware::AdminAuth;
use crate::response::PaginatedResponse;
use crate::state::AppState;
use axum::{
    extract::{Query, State},
    Json,
};
use invoicely_activity_types::{ActivityLog, ActivityQuery};

pub async fn list_activity(
    State(state): State<AppState>,
    AdminAuth(_user): AdminAuth,
    Query(query): Query<ActivityQuery>,
) -> Json<PaginatedResponse<ActivityLog>> {
    let page = state.journal.query(&query).await;
    Json(
        PaginatedResponse::new(page.items, page.page, page.per_page, page.total)
            .with_links("/api/v1/activity-logs"),
    )
}
