//! Gate-side pass verification.

use axum::{extract::State, Json};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::info;

use domain::models::pass::PassPayload;
use domain::models::pre_approval::{PreApproval, PreApprovalResponse, PreApprovalStatus};
use persistence::repositories::PreApprovalRepository;

use crate::app::AppState;
use crate::error::ApiError;
use crate::extractors::StaffUser;
use crate::middleware::metrics::record_pass_verification;

/// A scanned pass as the gate scanner hands it over.
#[derive(Debug, Deserialize)]
pub struct VerifyPassRequest {
    /// The raw JSON string decoded from the QR image
    pub payload: String,
}

/// Verification verdict.
#[derive(Debug, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct VerifyPassResponse {
    pub valid: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub entry: Option<PreApprovalResponse>,
}

impl VerifyPassResponse {
    fn rejected(reason: &str) -> Self {
        Self {
            valid: false,
            reason: Some(reason.to_string()),
            entry: None,
        }
    }
}

/// Verify a scanned pass and admit the visitor.
///
/// POST /api/v1/passes/verify
///
/// Signature and expiry checks are pure; a malformed or tampered pass is
/// reported as invalid, never as an error. A valid pass on an active entry
/// marks the entry used so it cannot be presented twice.
pub async fn verify_pass(
    State(state): State<AppState>,
    staff: StaffUser,
    Json(request): Json<VerifyPassRequest>,
) -> Result<Json<VerifyPassResponse>, ApiError> {
    staff.require_gate_operator()?;

    let now = Utc::now();

    let Ok(pass) = PassPayload::from_json(&request.payload) else {
        record_pass_verification(false);
        return Ok(Json(VerifyPassResponse::rejected("Pass is not readable")));
    };

    if !pass.verify(state.config.qr.signing_secret.as_bytes(), now) {
        record_pass_verification(false);
        return Ok(Json(VerifyPassResponse::rejected(
            "Signature or validity check failed",
        )));
    }

    let repo = PreApprovalRepository::new(state.pool.clone());
    repo.expire_overdue(now).await?;

    let entry = repo.find_by_id(pass.claims.visitor_id).await?;
    let Some(entry) = entry else {
        record_pass_verification(false);
        return Ok(Json(VerifyPassResponse::rejected("No matching entry")));
    };

    let entry: PreApproval = entry.into();
    match entry.status {
        PreApprovalStatus::Used => {
            record_pass_verification(false);
            return Ok(Json(VerifyPassResponse::rejected(
                "Pass has already been used",
            )));
        }
        PreApprovalStatus::Expired => {
            record_pass_verification(false);
            return Ok(Json(VerifyPassResponse::rejected("Pass has expired")));
        }
        PreApprovalStatus::Active => {}
    }

    let admitted = repo
        .mark_used(entry.id)
        .await?
        .ok_or_else(|| ApiError::Conflict("Entry state changed during verification".to_string()))?;

    info!(
        entry_id = %entry.id,
        visitor = %entry.visitor_name,
        operator = %staff.user_id,
        "Pass verified, visitor admitted"
    );
    record_pass_verification(true);

    let admitted: PreApproval = admitted.into();
    Ok(Json(VerifyPassResponse {
        valid: true,
        reason: None,
        entry: Some(admitted.into()),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejected_response_shape() {
        let response = VerifyPassResponse::rejected("Pass has expired");
        assert!(!response.valid);
        assert_eq!(response.reason.as_deref(), Some("Pass has expired"));
        assert!(response.entry.is_none());
    }

    #[test]
    fn test_rejected_response_serializes_without_entry() {
        let response = VerifyPassResponse::rejected("No matching entry");
        let json = serde_json::to_string(&response).unwrap();
        assert!(json.contains("\"valid\":false"));
        assert!(!json.contains("entry"));
    }
}
