//! Reception dashboard counters.

use axum::{extract::State, Json};
use chrono::Utc;

use domain::models::dashboard::DashboardSummary;
use persistence::entities::VisitorStatusDb;
use persistence::repositories::{PreApprovalRepository, VisitorRepository};

use crate::app::AppState;
use crate::error::ApiError;
use crate::extractors::StaffUser;

/// Today's headline numbers for the reception dashboard.
///
/// GET /api/v1/dashboard
pub async fn dashboard_summary(
    State(state): State<AppState>,
    staff: StaffUser,
) -> Result<Json<DashboardSummary>, ApiError> {
    staff.require_gate_operator()?;

    let now = Utc::now();
    let visitor_repo = VisitorRepository::new(state.pool.clone());
    let pre_approval_repo = PreApprovalRepository::new(state.pool.clone());

    pre_approval_repo.expire_overdue(now).await?;

    let visitors_today = visitor_repo.count_registered_on(now.date_naive()).await?;
    let checked_in = visitor_repo
        .count_with_status(VisitorStatusDb::CheckedIn)
        .await?;
    let pending_approvals = visitor_repo
        .count_with_status(VisitorStatusDb::Pending)
        .await?;
    let stats = pre_approval_repo.stats(None).await?;

    Ok(Json(DashboardSummary {
        visitors_today,
        checked_in,
        pending_approvals,
        active_pre_approvals: stats.active,
        passes_sent: stats.sent,
    }))
}
