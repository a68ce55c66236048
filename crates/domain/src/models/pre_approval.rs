//! Pre-approval domain models.
//!
//! A pre-approval is a scheduled, host-authorized visit that can have an
//! entry pass emailed to the visitor ahead of time. The entry's own
//! lifecycle (`active` / `expired` / `used`) is distinct from the delivery
//! sub-state of the pass email.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};
use uuid::Uuid;
use validator::{Validate, ValidationError};

use shared::validation::{validate_purpose, validate_time_window, validate_wall_clock_time};

/// Display prefix of the human-readable pass token.
pub const PASS_CODE_PREFIX: &str = "QR-PRE-";

/// Lifecycle state of a pre-approval entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PreApprovalStatus {
    Active,
    Expired,
    Used,
}

/// Delivery state of the pass email, distinct from the entry lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeliveryStatus {
    NotSent,
    Sending,
    Sent,
    Failed,
}

impl DeliveryStatus {
    /// Whether a send may be (re)initiated from this state.
    ///
    /// `sending` blocks to prevent duplicate submissions while an attempt
    /// is outstanding. A re-send from `sent` stays allowed.
    pub fn can_trigger_send(&self) -> bool {
        !matches!(self, DeliveryStatus::Sending)
    }

    /// Whether this is a resting state (a resolved attempt or no attempt).
    pub fn is_terminal(&self) -> bool {
        !matches!(self, DeliveryStatus::Sending)
    }
}

/// A pre-approved visit record.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct PreApproval {
    pub id: Uuid,
    pub visitor_name: String,
    pub visitor_email: String,
    pub visitor_phone: String,
    pub purpose: String,
    pub scheduled_date: NaiveDate,
    /// Start of the visit window, "HH:MM" wall clock
    pub start_time: String,
    /// End of the visit window, "HH:MM" wall clock
    pub end_time: String,
    pub host_id: Uuid,
    pub host_name: String,
    pub status: PreApprovalStatus,
    /// Human-readable display token, not cryptographic material
    pub qr_code: String,
    pub qr_sent: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub qr_sent_at: Option<DateTime<Utc>>,
    pub qr_sent_status: DeliveryStatus,
    /// Hard expiry boundary: end of the scheduled day
    pub valid_until: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

impl PreApproval {
    /// Whether the pass window has closed.
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now > self.valid_until
    }
}

/// End-of-day expiry boundary for a scheduled date: 23:59:59.999.
///
/// Wall-clock values carry no timezone in this system; they are
/// interpreted as UTC throughout.
pub fn end_of_day(date: NaiveDate) -> DateTime<Utc> {
    date.and_hms_milli_opt(23, 59, 59, 999)
        .expect("23:59:59.999 is a valid wall-clock time")
        .and_utc()
}

static PASS_CODE_COUNTER: AtomicU64 = AtomicU64::new(0);

/// Generates a display pass code: the prefix plus the last six digits of a
/// monotonically increasing millisecond counter.
///
/// The counter never repeats within a process even when two codes are
/// requested in the same millisecond.
pub fn generate_pass_code() -> String {
    let now_millis = Utc::now().timestamp_millis().max(0) as u64;
    let tick = PASS_CODE_COUNTER
        .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |prev| {
            Some(prev.max(now_millis.saturating_sub(1)) + 1)
        })
        .expect("fetch_update closure always returns Some");
    format!("{}{:06}", PASS_CODE_PREFIX, tick % 1_000_000)
}

/// Request to create a pre-approval.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "snake_case")]
#[validate(schema(function = "validate_visit_window"))]
pub struct CreatePreApprovalRequest {
    #[validate(length(min = 1, max = 120, message = "Visitor name is required"))]
    pub visitor_name: String,

    #[validate(email(message = "Visitor email must be a valid address"))]
    pub visitor_email: String,

    #[validate(length(min = 3, max = 40, message = "Visitor phone is required"))]
    pub visitor_phone: String,

    #[validate(custom(function = "validate_purpose"))]
    pub purpose: String,

    pub scheduled_date: NaiveDate,

    #[validate(custom(function = "validate_wall_clock_time"))]
    pub start_time: String,

    #[validate(custom(function = "validate_wall_clock_time"))]
    pub end_time: String,
}

fn validate_visit_window(request: &CreatePreApprovalRequest) -> Result<(), ValidationError> {
    validate_time_window(&request.start_time, &request.end_time)
}

/// Response for a single pre-approval entry.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct PreApprovalResponse {
    pub id: Uuid,
    pub visitor_name: String,
    pub visitor_email: String,
    pub visitor_phone: String,
    pub purpose: String,
    pub scheduled_date: NaiveDate,
    pub start_time: String,
    pub end_time: String,
    pub host_id: Uuid,
    pub host_name: String,
    pub status: PreApprovalStatus,
    pub qr_code: String,
    pub qr_sent: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub qr_sent_at: Option<DateTime<Utc>>,
    pub qr_sent_status: DeliveryStatus,
    pub valid_until: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

impl From<PreApproval> for PreApprovalResponse {
    fn from(entry: PreApproval) -> Self {
        Self {
            id: entry.id,
            visitor_name: entry.visitor_name,
            visitor_email: entry.visitor_email,
            visitor_phone: entry.visitor_phone,
            purpose: entry.purpose,
            scheduled_date: entry.scheduled_date,
            start_time: entry.start_time,
            end_time: entry.end_time,
            host_id: entry.host_id,
            host_name: entry.host_name,
            status: entry.status,
            qr_code: entry.qr_code,
            qr_sent: entry.qr_sent,
            qr_sent_at: entry.qr_sent_at,
            qr_sent_status: entry.qr_sent_status,
            valid_until: entry.valid_until,
            created_at: entry.created_at,
        }
    }
}

/// Response for listing pre-approvals (newest first).
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct ListPreApprovalsResponse {
    pub data: Vec<PreApprovalResponse>,
}

/// Summary counters shown above the pre-approval list.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct PreApprovalStats {
    pub total: i64,
    pub sent: i64,
    pub active: i64,
}

/// Response after a pass email was accepted by the delivery provider.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct SendPassResponse {
    pub message_id: String,
    pub recipient: String,
    pub valid_until: DateTime<Utc>,
    pub qr_sent_status: DeliveryStatus,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_request() -> CreatePreApprovalRequest {
        CreatePreApprovalRequest {
            visitor_name: "Jane Roe".to_string(),
            visitor_email: "jane.roe@example.com".to_string(),
            visitor_phone: "+1-555-0100".to_string(),
            purpose: "Business Meeting".to_string(),
            scheduled_date: NaiveDate::from_ymd_opt(2025, 3, 1).unwrap(),
            start_time: "10:00".to_string(),
            end_time: "11:00".to_string(),
        }
    }

    #[test]
    fn test_end_of_day_boundary() {
        let date = NaiveDate::from_ymd_opt(2025, 3, 1).unwrap();
        let boundary = end_of_day(date);
        assert_eq!(boundary.to_rfc3339(), "2025-03-01T23:59:59.999+00:00");
    }

    #[test]
    fn test_pass_code_format() {
        let code = generate_pass_code();
        assert!(code.starts_with(PASS_CODE_PREFIX));
        let suffix = &code[PASS_CODE_PREFIX.len()..];
        assert_eq!(suffix.len(), 6);
        assert!(suffix.chars().all(|c| c.is_ascii_digit()));
    }

    #[test]
    fn test_pass_code_monotonic_within_process() {
        let codes: Vec<String> = (0..50).map(|_| generate_pass_code()).collect();
        let unique: std::collections::HashSet<_> = codes.iter().collect();
        assert_eq!(unique.len(), codes.len());
    }

    #[test]
    fn test_create_request_valid() {
        assert!(valid_request().validate().is_ok());
    }

    #[test]
    fn test_create_request_rejects_bad_email() {
        let mut request = valid_request();
        request.visitor_email = "not-an-email".to_string();
        assert!(request.validate().is_err());
    }

    #[test]
    fn test_create_request_rejects_empty_name() {
        let mut request = valid_request();
        request.visitor_name = String::new();
        assert!(request.validate().is_err());
    }

    #[test]
    fn test_create_request_rejects_inverted_window() {
        let mut request = valid_request();
        request.start_time = "11:00".to_string();
        request.end_time = "10:00".to_string();
        assert!(request.validate().is_err());
    }

    #[test]
    fn test_create_request_rejects_bad_time_format() {
        let mut request = valid_request();
        request.start_time = "10am".to_string();
        assert!(request.validate().is_err());
    }

    #[test]
    fn test_create_request_allows_free_text_purpose() {
        let mut request = valid_request();
        request.purpose = "Quarterly roof inspection".to_string();
        assert!(request.validate().is_ok());
    }

    #[test]
    fn test_delivery_status_send_gate() {
        assert!(DeliveryStatus::NotSent.can_trigger_send());
        assert!(DeliveryStatus::Failed.can_trigger_send());
        assert!(DeliveryStatus::Sent.can_trigger_send());
        assert!(!DeliveryStatus::Sending.can_trigger_send());
    }

    #[test]
    fn test_sending_is_not_a_resting_state() {
        assert!(!DeliveryStatus::Sending.is_terminal());
        assert!(DeliveryStatus::Sent.is_terminal());
        assert!(DeliveryStatus::Failed.is_terminal());
        assert!(DeliveryStatus::NotSent.is_terminal());
    }

    #[test]
    fn test_is_expired_at() {
        let date = NaiveDate::from_ymd_opt(2025, 3, 1).unwrap();
        let entry = PreApproval {
            id: Uuid::new_v4(),
            visitor_name: "Jane Roe".to_string(),
            visitor_email: "jane.roe@example.com".to_string(),
            visitor_phone: "+1-555-0100".to_string(),
            purpose: "Business Meeting".to_string(),
            scheduled_date: date,
            start_time: "10:00".to_string(),
            end_time: "11:00".to_string(),
            host_id: Uuid::new_v4(),
            host_name: "Alice Johnson".to_string(),
            status: PreApprovalStatus::Active,
            qr_code: generate_pass_code(),
            qr_sent: false,
            qr_sent_at: None,
            qr_sent_status: DeliveryStatus::NotSent,
            valid_until: end_of_day(date),
            created_at: Utc::now(),
        };

        let before = date.and_hms_opt(12, 0, 0).unwrap().and_utc();
        let after = date.succ_opt().unwrap().and_hms_opt(0, 0, 1).unwrap().and_utc();
        assert!(!entry.is_expired_at(before));
        assert!(entry.is_expired_at(after));
    }
}
