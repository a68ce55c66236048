//! Walk-in visitor domain models.
//!
//! Visitors registered at the front desk go through an approval flow
//! (pending → approved/rejected) and, once approved, can be checked in and
//! out at the gate. Pre-approved visits live in
//! [`crate::models::pre_approval`] instead.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};
use uuid::Uuid;
use validator::Validate;

use shared::validation::validate_purpose;

/// Display prefix of visitor badge numbers.
pub const BADGE_PREFIX: &str = "VIS-";

/// Lifecycle state of a walk-in visitor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VisitorStatus {
    Pending,
    Approved,
    Rejected,
    CheckedIn,
    CheckedOut,
}

impl VisitorStatus {
    /// Whether a host decision (approve/reject) is still possible.
    pub fn awaiting_decision(&self) -> bool {
        matches!(self, VisitorStatus::Pending)
    }

    /// Whether the visitor can be checked in at the gate.
    pub fn can_check_in(&self) -> bool {
        matches!(self, VisitorStatus::Approved)
    }

    /// Whether the visitor can be checked out.
    pub fn can_check_out(&self) -> bool {
        matches!(self, VisitorStatus::CheckedIn)
    }
}

/// A walk-in visitor record.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct Visitor {
    pub id: Uuid,
    pub full_name: String,
    pub contact_number: String,
    pub email: String,
    pub purpose: String,
    pub host_id: Uuid,
    pub host_name: String,
    pub host_department: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub company_name: Option<String>,
    /// Front-desk photo as an opaque data URL; capture happens client-side
    #[serde(skip_serializing_if = "Option::is_none")]
    pub photo: Option<String>,
    pub badge_number: String,
    pub status: VisitorStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub check_in_time: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub check_out_time: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub approval_time: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub approved_by: Option<String>,
    pub created_at: DateTime<Utc>,
}

static BADGE_COUNTER: AtomicU64 = AtomicU64::new(0);

/// Generates a badge number: the prefix plus the last six digits of a
/// monotonically increasing millisecond counter.
pub fn generate_badge_number() -> String {
    let now_millis = Utc::now().timestamp_millis().max(0) as u64;
    let tick = BADGE_COUNTER
        .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |prev| {
            Some(prev.max(now_millis.saturating_sub(1)) + 1)
        })
        .expect("fetch_update closure always returns Some");
    format!("{}{:06}", BADGE_PREFIX, tick % 1_000_000)
}

/// Request to register a walk-in visitor.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "snake_case")]
pub struct RegisterVisitorRequest {
    #[validate(length(min = 1, max = 120, message = "Full name is required"))]
    pub full_name: String,

    #[validate(length(min = 3, max = 40, message = "Contact number is required"))]
    pub contact_number: String,

    #[validate(email(message = "Email must be a valid address"))]
    pub email: String,

    #[validate(custom(function = "validate_purpose"))]
    pub purpose: String,

    pub host_id: Uuid,

    #[validate(length(min = 1, max = 120, message = "Host name is required"))]
    pub host_name: String,

    #[validate(length(min = 1, max = 120, message = "Host department is required"))]
    pub host_department: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub company_name: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub photo: Option<String>,
}

/// Directory query filters.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct VisitorQuery {
    pub status: Option<VisitorStatus>,
    /// Case-insensitive match against name or badge number
    pub search: Option<String>,
}

/// Response for a single visitor.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct VisitorResponse {
    pub id: Uuid,
    pub full_name: String,
    pub contact_number: String,
    pub email: String,
    pub purpose: String,
    pub host_id: Uuid,
    pub host_name: String,
    pub host_department: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub company_name: Option<String>,
    pub badge_number: String,
    pub status: VisitorStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub check_in_time: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub check_out_time: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub approval_time: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub approved_by: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<Visitor> for VisitorResponse {
    fn from(visitor: Visitor) -> Self {
        Self {
            id: visitor.id,
            full_name: visitor.full_name,
            contact_number: visitor.contact_number,
            email: visitor.email,
            purpose: visitor.purpose,
            host_id: visitor.host_id,
            host_name: visitor.host_name,
            host_department: visitor.host_department,
            company_name: visitor.company_name,
            badge_number: visitor.badge_number,
            status: visitor.status,
            check_in_time: visitor.check_in_time,
            check_out_time: visitor.check_out_time,
            approval_time: visitor.approval_time,
            approved_by: visitor.approved_by,
            created_at: visitor.created_at,
        }
    }
}

/// Response for listing visitors (newest first).
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct ListVisitorsResponse {
    pub data: Vec<VisitorResponse>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_request() -> RegisterVisitorRequest {
        RegisterVisitorRequest {
            full_name: "John Doe".to_string(),
            contact_number: "+1-555-0123".to_string(),
            email: "john.doe@techcorp.example".to_string(),
            purpose: "Interview".to_string(),
            host_id: Uuid::new_v4(),
            host_name: "Alice Johnson".to_string(),
            host_department: "Engineering".to_string(),
            company_name: Some("Tech Corp".to_string()),
            photo: None,
        }
    }

    #[test]
    fn test_badge_number_format() {
        let badge = generate_badge_number();
        assert!(badge.starts_with(BADGE_PREFIX));
        let suffix = &badge[BADGE_PREFIX.len()..];
        assert_eq!(suffix.len(), 6);
        assert!(suffix.chars().all(|c| c.is_ascii_digit()));
    }

    #[test]
    fn test_badge_numbers_unique() {
        let badges: Vec<String> = (0..50).map(|_| generate_badge_number()).collect();
        let unique: std::collections::HashSet<_> = badges.iter().collect();
        assert_eq!(unique.len(), badges.len());
    }

    #[test]
    fn test_register_request_valid() {
        assert!(valid_request().validate().is_ok());
    }

    #[test]
    fn test_register_request_rejects_bad_email() {
        let mut request = valid_request();
        request.email = "nope".to_string();
        assert!(request.validate().is_err());
    }

    #[test]
    fn test_register_request_rejects_empty_purpose() {
        let mut request = valid_request();
        request.purpose = "  ".to_string();
        assert!(request.validate().is_err());
    }

    #[test]
    fn test_status_transitions() {
        assert!(VisitorStatus::Pending.awaiting_decision());
        assert!(!VisitorStatus::Approved.awaiting_decision());

        assert!(VisitorStatus::Approved.can_check_in());
        assert!(!VisitorStatus::Pending.can_check_in());
        assert!(!VisitorStatus::Rejected.can_check_in());

        assert!(VisitorStatus::CheckedIn.can_check_out());
        assert!(!VisitorStatus::Approved.can_check_out());
        assert!(!VisitorStatus::CheckedOut.can_check_out());
    }
}
