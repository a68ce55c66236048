//! Pre-approval routes: record management and pass delivery.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use chrono::Utc;
use tracing::info;
use uuid::Uuid;
use validator::Validate;

use domain::models::pre_approval::{
    end_of_day, generate_pass_code, CreatePreApprovalRequest, DeliveryStatus,
    ListPreApprovalsResponse, PreApproval, PreApprovalResponse, PreApprovalStats,
    PreApprovalStatus, SendPassResponse,
};
use persistence::entities::DeliveryStatusDb;
use persistence::repositories::{NewPreApprovalRecord, PreApprovalRepository};

use crate::app::AppState;
use crate::error::ApiError;
use crate::extractors::StaffUser;
use crate::middleware::metrics::{record_pass_send_failed, record_pass_sent};
use crate::services::PassDeliveryError;

/// Create a pre-approval entry.
///
/// POST /api/v1/pre-approvals
///
/// The authenticated staff member becomes the host of the visit.
pub async fn create_pre_approval(
    State(state): State<AppState>,
    staff: StaffUser,
    Json(request): Json<CreatePreApprovalRequest>,
) -> Result<(StatusCode, Json<PreApprovalResponse>), ApiError> {
    request.validate()?;

    let repo = PreApprovalRepository::new(state.pool.clone());

    let entry = repo
        .create(NewPreApprovalRecord {
            visitor_name: request.visitor_name,
            visitor_email: request.visitor_email,
            visitor_phone: request.visitor_phone,
            purpose: request.purpose,
            scheduled_date: request.scheduled_date,
            start_time: request.start_time,
            end_time: request.end_time,
            host_id: staff.user_id,
            host_name: staff.display_name.clone(),
            qr_code: generate_pass_code(),
            valid_until: end_of_day(request.scheduled_date),
        })
        .await?;

    info!(
        entry_id = %entry.id,
        host_id = %staff.user_id,
        scheduled_date = %entry.scheduled_date,
        "Pre-approval created"
    );

    let entry: PreApproval = entry.into();
    Ok((StatusCode::CREATED, Json(entry.into())))
}

/// List pre-approval entries, newest first.
///
/// GET /api/v1/pre-approvals
///
/// Administrators see every entry; other staff only their own.
pub async fn list_pre_approvals(
    State(state): State<AppState>,
    staff: StaffUser,
) -> Result<Json<ListPreApprovalsResponse>, ApiError> {
    let repo = PreApprovalRepository::new(state.pool.clone());

    repo.expire_overdue(Utc::now()).await?;

    let entries = if staff.role.sees_all_records() {
        repo.list_all().await?
    } else {
        repo.list_for_host(staff.user_id).await?
    };

    let data = entries
        .into_iter()
        .map(|e| PreApproval::from(e).into())
        .collect();

    Ok(Json(ListPreApprovalsResponse { data }))
}

/// Summary counters over pre-approval entries.
///
/// GET /api/v1/pre-approvals/stats
pub async fn pre_approval_stats(
    State(state): State<AppState>,
    staff: StaffUser,
) -> Result<Json<PreApprovalStats>, ApiError> {
    let repo = PreApprovalRepository::new(state.pool.clone());

    repo.expire_overdue(Utc::now()).await?;

    let scope = if staff.role.sees_all_records() {
        None
    } else {
        Some(staff.user_id)
    };
    let stats = repo.stats(scope).await?;

    Ok(Json(PreApprovalStats {
        total: stats.total,
        sent: stats.sent,
        active: stats.active,
    }))
}

/// Issue and email the entry pass for a pre-approval.
///
/// POST /api/v1/pre-approvals/:id/send
///
/// Moves the delivery sub-state to `sending` for the duration of the
/// attempt; a concurrent trigger gets 409. Re-sending an already sent
/// pass is allowed.
pub async fn send_pass(
    State(state): State<AppState>,
    staff: StaffUser,
    Path(id): Path<Uuid>,
) -> Result<Json<SendPassResponse>, ApiError> {
    let repo = PreApprovalRepository::new(state.pool.clone());
    let now = Utc::now();

    repo.expire_overdue(now).await?;

    let entry = repo
        .find_by_id(id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Pre-approval not found".to_string()))?;

    if !staff.role.sees_all_records() && entry.host_id != staff.user_id {
        return Err(ApiError::NotFound("Pre-approval not found".to_string()));
    }

    let entry: PreApproval = entry.into();

    if entry.status != PreApprovalStatus::Active {
        let message = match entry.status {
            PreApprovalStatus::Expired => "Cannot send a pass for an expired entry",
            PreApprovalStatus::Used => "Cannot send a pass for a used entry",
            PreApprovalStatus::Active => unreachable!(),
        };
        return Err(ApiError::Conflict(message.to_string()));
    }

    // Claim the send. None here means another attempt is mid-flight.
    let claimed = repo.begin_send(id).await?;
    let Some(claimed) = claimed else {
        return Err(ApiError::Conflict(
            "A send for this pass is already in progress".to_string(),
        ));
    };
    let prior_status = entry.qr_sent_status;
    let prior_sent_at = entry.qr_sent_at;
    let entry: PreApproval = claimed.into();

    match state.pass_mailer.send_pass(&entry, now).await {
        Ok(message_id) => {
            let sent_at = Utc::now();
            repo.update_delivery_status(id, DeliveryStatusDb::Sent, Some(sent_at))
                .await?;
            record_pass_sent();

            Ok(Json(SendPassResponse {
                message_id,
                recipient: entry.visitor_email,
                valid_until: entry.valid_until,
                qr_sent_status: DeliveryStatus::Sent,
            }))
        }
        Err(PassDeliveryError::Generation(msg)) => {
            // The attempt never reached the provider; restore the prior
            // resting state instead of recording a failed delivery.
            repo.update_delivery_status(id, prior_status.into(), prior_sent_at)
                .await?;
            Err(ApiError::PassGeneration(msg))
        }
        Err(PassDeliveryError::Dispatch(msg)) => {
            repo.update_delivery_status(id, DeliveryStatusDb::Failed, None)
                .await?;
            record_pass_send_failed();
            Err(ApiError::Dispatch(msg))
        }
    }
}

