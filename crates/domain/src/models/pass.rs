//! Signed QR pass payload.
//!
//! The payload is what actually gets rasterized into the QR image: the
//! visit facts plus an HMAC-SHA256 signature computed server-side over the
//! canonical JSON of everything except the signature itself. A gate scanner
//! recomputes the tag and additionally rejects passes past `valid_until`.

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::pre_approval::PreApproval;

/// The visit time window carried in the pass.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeWindow {
    pub start: String,
    pub end: String,
}

/// Signed fields of a pass, serialized in this exact order to form the
/// canonical string the signature covers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PassClaims {
    pub visitor_id: Uuid,
    pub name: String,
    pub email: String,
    pub host_employee: String,
    pub purpose: String,
    /// Calendar date, "YYYY-MM-DD"
    pub scheduled_date: String,
    pub time_window: TimeWindow,
    /// RFC 3339 expiry boundary
    pub valid_until: String,
    /// RFC 3339 creation instant of this payload
    pub created_at: String,
}

impl PassClaims {
    /// Canonical serialization the signature is computed over.
    pub fn canonical(&self) -> String {
        serde_json::to_string(self).expect("pass claims serialize to JSON")
    }
}

/// A complete pass: signed claims plus the signature tag.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PassPayload {
    #[serde(flatten)]
    pub claims: PassClaims,
    /// Hex-encoded HMAC-SHA256 over the canonical claims
    pub signature: String,
}

impl PassPayload {
    /// Builds and signs a pass for a pre-approval entry.
    pub fn issue(entry: &PreApproval, now: DateTime<Utc>, signing_key: &[u8]) -> Self {
        let claims = PassClaims {
            visitor_id: entry.id,
            name: entry.visitor_name.clone(),
            email: entry.visitor_email.clone(),
            host_employee: entry.host_name.clone(),
            purpose: entry.purpose.clone(),
            scheduled_date: entry.scheduled_date.format("%Y-%m-%d").to_string(),
            time_window: TimeWindow {
                start: entry.start_time.clone(),
                end: entry.end_time.clone(),
            },
            valid_until: entry
                .valid_until
                .to_rfc3339_opts(SecondsFormat::Millis, true),
            created_at: now.to_rfc3339_opts(SecondsFormat::Millis, true),
        };

        let signature = shared::crypto::sign_hex(signing_key, &claims.canonical());
        Self { claims, signature }
    }

    /// Pure verification: the signature must match the recomputed tag and
    /// `now` must not be past `valid_until`. No side effects; same input
    /// always yields the same result.
    pub fn verify(&self, signing_key: &[u8], now: DateTime<Utc>) -> bool {
        let Ok(valid_until) = DateTime::parse_from_rfc3339(&self.claims.valid_until) else {
            return false;
        };
        if now > valid_until.with_timezone(&Utc) {
            return false;
        }

        shared::crypto::verify_hex(signing_key, &self.claims.canonical(), &self.signature)
    }

    /// The exact string rasterized into the QR image.
    pub fn to_json(&self) -> String {
        serde_json::to_string(self).expect("pass payload serializes to JSON")
    }

    /// Parses a scanned pass back from its JSON form.
    pub fn from_json(input: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(input)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::pre_approval::{
        end_of_day, generate_pass_code, DeliveryStatus, PreApprovalStatus,
    };
    use chrono::NaiveDate;

    const KEY: &[u8] = b"gate-signing-secret";

    fn entry() -> PreApproval {
        let date = NaiveDate::from_ymd_opt(2025, 3, 1).unwrap();
        PreApproval {
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
        }
    }

    fn noon() -> DateTime<Utc> {
        NaiveDate::from_ymd_opt(2025, 3, 1)
            .unwrap()
            .and_hms_opt(12, 0, 0)
            .unwrap()
            .and_utc()
    }

    #[test]
    fn test_issue_and_verify() {
        let pass = PassPayload::issue(&entry(), noon(), KEY);
        assert!(pass.verify(KEY, noon()));
    }

    #[test]
    fn test_verify_is_idempotent() {
        let pass = PassPayload::issue(&entry(), noon(), KEY);
        assert_eq!(pass.verify(KEY, noon()), pass.verify(KEY, noon()));
    }

    #[test]
    fn test_verify_rejects_expired_pass() {
        // Correct signature, but the scheduled day has passed
        let pass = PassPayload::issue(&entry(), noon(), KEY);
        let day_after = NaiveDate::from_ymd_opt(2025, 3, 2)
            .unwrap()
            .and_hms_opt(0, 0, 1)
            .unwrap()
            .and_utc();
        assert!(!pass.verify(KEY, day_after));
    }

    #[test]
    fn test_verify_accepts_at_exact_boundary() {
        let pass = PassPayload::issue(&entry(), noon(), KEY);
        let boundary = end_of_day(NaiveDate::from_ymd_opt(2025, 3, 1).unwrap());
        assert!(pass.verify(KEY, boundary));
    }

    #[test]
    fn test_verify_rejects_tampered_purpose() {
        let mut pass = PassPayload::issue(&entry(), noon(), KEY);
        pass.claims.purpose = "Server Room Access".to_string();
        assert!(!pass.verify(KEY, noon()));
    }

    #[test]
    fn test_verify_rejects_tampered_validity() {
        let mut pass = PassPayload::issue(&entry(), noon(), KEY);
        pass.claims.valid_until = "2030-01-01T23:59:59.999Z".to_string();
        assert!(!pass.verify(KEY, noon()));
    }

    #[test]
    fn test_verify_rejects_wrong_key() {
        let pass = PassPayload::issue(&entry(), noon(), KEY);
        assert!(!pass.verify(b"some-other-secret", noon()));
    }

    #[test]
    fn test_verify_rejects_garbled_expiry() {
        let mut pass = PassPayload::issue(&entry(), noon(), KEY);
        pass.claims.valid_until = "end of march".to_string();
        assert!(!pass.verify(KEY, noon()));
    }

    #[test]
    fn test_json_round_trip_preserves_pass() {
        let pass = PassPayload::issue(&entry(), noon(), KEY);
        let json = pass.to_json();
        let parsed = PassPayload::from_json(&json).unwrap();
        assert_eq!(parsed, pass);
        assert!(parsed.verify(KEY, noon()));
        // Re-serialization is byte-for-byte stable
        assert_eq!(parsed.to_json(), json);
    }

    #[test]
    fn test_payload_carries_all_visit_facts() {
        let entry = entry();
        let pass = PassPayload::issue(&entry, noon(), KEY);
        assert_eq!(pass.claims.visitor_id, entry.id);
        assert_eq!(pass.claims.name, entry.visitor_name);
        assert_eq!(pass.claims.email, entry.visitor_email);
        assert_eq!(pass.claims.host_employee, entry.host_name);
        assert_eq!(pass.claims.scheduled_date, "2025-03-01");
        assert_eq!(pass.claims.time_window.start, "10:00");
        assert_eq!(pass.claims.time_window.end, "11:00");
        assert_eq!(pass.claims.valid_until, "2025-03-01T23:59:59.999Z");
    }
}
