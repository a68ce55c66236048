//! Pre-approval entity (database row mapping).

use chrono::{DateTime, NaiveDate, Utc};
use sqlx::FromRow;
use uuid::Uuid;

use domain::models::pre_approval::{DeliveryStatus, PreApproval, PreApprovalStatus};

/// Database enum for pre_approval_status that maps to the PostgreSQL enum type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, sqlx::Type)]
#[sqlx(type_name = "pre_approval_status", rename_all = "snake_case")]
pub enum PreApprovalStatusDb {
    Active,
    Expired,
    Used,
}

impl From<PreApprovalStatusDb> for PreApprovalStatus {
    fn from(db: PreApprovalStatusDb) -> Self {
        match db {
            PreApprovalStatusDb::Active => PreApprovalStatus::Active,
            PreApprovalStatusDb::Expired => PreApprovalStatus::Expired,
            PreApprovalStatusDb::Used => PreApprovalStatus::Used,
        }
    }
}

impl From<PreApprovalStatus> for PreApprovalStatusDb {
    fn from(status: PreApprovalStatus) -> Self {
        match status {
            PreApprovalStatus::Active => PreApprovalStatusDb::Active,
            PreApprovalStatus::Expired => PreApprovalStatusDb::Expired,
            PreApprovalStatus::Used => PreApprovalStatusDb::Used,
        }
    }
}

/// Database enum for delivery_status that maps to the PostgreSQL enum type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, sqlx::Type)]
#[sqlx(type_name = "delivery_status", rename_all = "snake_case")]
pub enum DeliveryStatusDb {
    NotSent,
    Sending,
    Sent,
    Failed,
}

impl From<DeliveryStatusDb> for DeliveryStatus {
    fn from(db: DeliveryStatusDb) -> Self {
        match db {
            DeliveryStatusDb::NotSent => DeliveryStatus::NotSent,
            DeliveryStatusDb::Sending => DeliveryStatus::Sending,
            DeliveryStatusDb::Sent => DeliveryStatus::Sent,
            DeliveryStatusDb::Failed => DeliveryStatus::Failed,
        }
    }
}

impl From<DeliveryStatus> for DeliveryStatusDb {
    fn from(status: DeliveryStatus) -> Self {
        match status {
            DeliveryStatus::NotSent => DeliveryStatusDb::NotSent,
            DeliveryStatus::Sending => DeliveryStatusDb::Sending,
            DeliveryStatus::Sent => DeliveryStatusDb::Sent,
            DeliveryStatus::Failed => DeliveryStatusDb::Failed,
        }
    }
}

/// Database row mapping for the pre_approvals table.
#[derive(Debug, Clone, FromRow)]
pub struct PreApprovalEntity {
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
    pub status: PreApprovalStatusDb,
    pub qr_code: String,
    pub qr_sent: bool,
    pub qr_sent_at: Option<DateTime<Utc>>,
    pub qr_sent_status: DeliveryStatusDb,
    pub valid_until: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

impl From<PreApprovalEntity> for PreApproval {
    fn from(entity: PreApprovalEntity) -> Self {
        Self {
            id: entity.id,
            visitor_name: entity.visitor_name,
            visitor_email: entity.visitor_email,
            visitor_phone: entity.visitor_phone,
            purpose: entity.purpose,
            scheduled_date: entity.scheduled_date,
            start_time: entity.start_time,
            end_time: entity.end_time,
            host_id: entity.host_id,
            host_name: entity.host_name,
            status: entity.status.into(),
            qr_code: entity.qr_code,
            qr_sent: entity.qr_sent,
            qr_sent_at: entity.qr_sent_at,
            qr_sent_status: entity.qr_sent_status.into(),
            valid_until: entity.valid_until,
            created_at: entity.created_at,
        }
    }
}

/// Aggregate counters over a host's (or the whole org's) entries.
#[derive(Debug, Clone, FromRow)]
pub struct PreApprovalStatsEntity {
    pub total: i64,
    pub sent: i64,
    pub active: i64,
}
