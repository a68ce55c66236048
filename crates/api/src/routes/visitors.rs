//! Walk-in visitor routes: registration, approval, and gate movements.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use chrono::Utc;
use tracing::info;
use uuid::Uuid;
use validator::Validate;

use domain::models::visitor::{
    generate_badge_number, ListVisitorsResponse, RegisterVisitorRequest, Visitor, VisitorQuery,
    VisitorResponse,
};
use persistence::repositories::{NewVisitorRecord, VisitorRepository};

use crate::app::AppState;
use crate::error::ApiError;
use crate::extractors::StaffUser;

/// Register a walk-in visitor at the front desk.
///
/// POST /api/v1/visitors
///
/// The visitor starts in `pending` with a pre-assigned badge number and
/// waits for the named host to approve the visit.
pub async fn register_visitor(
    State(state): State<AppState>,
    _staff: StaffUser,
    Json(request): Json<RegisterVisitorRequest>,
) -> Result<(StatusCode, Json<VisitorResponse>), ApiError> {
    request.validate()?;

    let repo = VisitorRepository::new(state.pool.clone());

    let visitor = repo
        .create(NewVisitorRecord {
            full_name: request.full_name,
            contact_number: request.contact_number,
            email: request.email,
            purpose: request.purpose,
            host_id: request.host_id,
            host_name: request.host_name,
            host_department: request.host_department,
            company_name: request.company_name,
            photo: request.photo,
            badge_number: generate_badge_number(),
        })
        .await?;

    info!(
        visitor_id = %visitor.id,
        host_id = %visitor.host_id,
        badge = %visitor.badge_number,
        "Visitor registered"
    );

    let visitor: Visitor = visitor.into();
    Ok((StatusCode::CREATED, Json(visitor.into())))
}

/// Visitor directory with optional status and search filters.
///
/// GET /api/v1/visitors
///
/// Gate staff and administrators see the whole directory.
pub async fn list_visitors(
    State(state): State<AppState>,
    staff: StaffUser,
    Query(query): Query<VisitorQuery>,
) -> Result<Json<ListVisitorsResponse>, ApiError> {
    staff.require_gate_operator()?;

    let repo = VisitorRepository::new(state.pool.clone());
    let visitors = repo
        .list(query.status.map(Into::into), query.search.as_deref())
        .await?;

    let data = visitors
        .into_iter()
        .map(|v| Visitor::from(v).into())
        .collect();

    Ok(Json(ListVisitorsResponse { data }))
}

/// Visitors waiting for a host decision, oldest first.
///
/// GET /api/v1/visitors/pending
///
/// Administrators see every pending visitor; other staff only those who
/// named them as host.
pub async fn list_pending_visitors(
    State(state): State<AppState>,
    staff: StaffUser,
) -> Result<Json<ListVisitorsResponse>, ApiError> {
    let repo = VisitorRepository::new(state.pool.clone());

    let scope = if staff.role.sees_all_records() {
        None
    } else {
        Some(staff.user_id)
    };
    let visitors = repo.list_pending(scope).await?;

    let data = visitors
        .into_iter()
        .map(|v| Visitor::from(v).into())
        .collect();

    Ok(Json(ListVisitorsResponse { data }))
}

/// Approve a pending visitor.
///
/// POST /api/v1/visitors/:id/approve
///
/// Only the named host or an administrator can decide.
pub async fn approve_visitor(
    State(state): State<AppState>,
    staff: StaffUser,
    Path(id): Path<Uuid>,
) -> Result<Json<VisitorResponse>, ApiError> {
    let repo = VisitorRepository::new(state.pool.clone());

    let visitor = require_decision_rights(&repo, &staff, id).await?;

    let updated = repo
        .approve(id, &staff.display_name, Utc::now())
        .await?
        .ok_or_else(|| {
            ApiError::Conflict(format!(
                "Visitor is no longer awaiting a decision (currently {:?})",
                visitor.status
            ))
        })?;

    info!(visitor_id = %id, approved_by = %staff.user_id, "Visitor approved");

    let updated: Visitor = updated.into();
    Ok(Json(updated.into()))
}

/// Reject a pending visitor.
///
/// POST /api/v1/visitors/:id/reject
pub async fn reject_visitor(
    State(state): State<AppState>,
    staff: StaffUser,
    Path(id): Path<Uuid>,
) -> Result<Json<VisitorResponse>, ApiError> {
    let repo = VisitorRepository::new(state.pool.clone());

    let visitor = require_decision_rights(&repo, &staff, id).await?;

    let updated = repo
        .reject(id, &staff.display_name, Utc::now())
        .await?
        .ok_or_else(|| {
            ApiError::Conflict(format!(
                "Visitor is no longer awaiting a decision (currently {:?})",
                visitor.status
            ))
        })?;

    info!(visitor_id = %id, rejected_by = %staff.user_id, "Visitor rejected");

    let updated: Visitor = updated.into();
    Ok(Json(updated.into()))
}

/// Check an approved visitor in at the gate.
///
/// POST /api/v1/visitors/:id/check-in
pub async fn check_in_visitor(
    State(state): State<AppState>,
    staff: StaffUser,
    Path(id): Path<Uuid>,
) -> Result<Json<VisitorResponse>, ApiError> {
    staff.require_gate_operator()?;

    let repo = VisitorRepository::new(state.pool.clone());

    repo.find_by_id(id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Visitor not found".to_string()))?;

    let updated = repo.check_in(id, Utc::now()).await?.ok_or_else(|| {
        ApiError::Conflict("Only approved visitors can be checked in".to_string())
    })?;

    info!(visitor_id = %id, operator = %staff.user_id, "Visitor checked in");

    let updated: Visitor = updated.into();
    Ok(Json(updated.into()))
}

/// Check a visitor out at the gate.
///
/// POST /api/v1/visitors/:id/check-out
pub async fn check_out_visitor(
    State(state): State<AppState>,
    staff: StaffUser,
    Path(id): Path<Uuid>,
) -> Result<Json<VisitorResponse>, ApiError> {
    staff.require_gate_operator()?;

    let repo = VisitorRepository::new(state.pool.clone());

    repo.find_by_id(id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Visitor not found".to_string()))?;

    let updated = repo.check_out(id, Utc::now()).await?.ok_or_else(|| {
        ApiError::Conflict("Only checked-in visitors can be checked out".to_string())
    })?;

    info!(visitor_id = %id, operator = %staff.user_id, "Visitor checked out");

    let updated: Visitor = updated.into();
    Ok(Json(updated.into()))
}

/// Loads the visitor and checks the caller may decide on it.
async fn require_decision_rights(
    repo: &VisitorRepository,
    staff: &StaffUser,
    id: Uuid,
) -> Result<Visitor, ApiError> {
    let visitor = repo
        .find_by_id(id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Visitor not found".to_string()))?;
    let visitor: Visitor = visitor.into();

    if !staff.role.sees_all_records() && visitor.host_id != staff.user_id {
        return Err(ApiError::Forbidden(
            "Only the host or an administrator can decide on this visitor".to_string(),
        ));
    }

    Ok(visitor)
}
