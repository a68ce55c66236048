//! Visitor entity (database row mapping).

use chrono::{DateTime, Utc};
use sqlx::FromRow;
use uuid::Uuid;

use domain::models::visitor::{Visitor, VisitorStatus};

/// Database enum for visitor_status that maps to the PostgreSQL enum type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, sqlx::Type)]
#[sqlx(type_name = "visitor_status", rename_all = "snake_case")]
pub enum VisitorStatusDb {
    Pending,
    Approved,
    Rejected,
    CheckedIn,
    CheckedOut,
}

impl From<VisitorStatusDb> for VisitorStatus {
    fn from(db: VisitorStatusDb) -> Self {
        match db {
            VisitorStatusDb::Pending => VisitorStatus::Pending,
            VisitorStatusDb::Approved => VisitorStatus::Approved,
            VisitorStatusDb::Rejected => VisitorStatus::Rejected,
            VisitorStatusDb::CheckedIn => VisitorStatus::CheckedIn,
            VisitorStatusDb::CheckedOut => VisitorStatus::CheckedOut,
        }
    }
}

impl From<VisitorStatus> for VisitorStatusDb {
    fn from(status: VisitorStatus) -> Self {
        match status {
            VisitorStatus::Pending => VisitorStatusDb::Pending,
            VisitorStatus::Approved => VisitorStatusDb::Approved,
            VisitorStatus::Rejected => VisitorStatusDb::Rejected,
            VisitorStatus::CheckedIn => VisitorStatusDb::CheckedIn,
            VisitorStatus::CheckedOut => VisitorStatusDb::CheckedOut,
        }
    }
}

/// Database row mapping for the visitors table.
#[derive(Debug, Clone, FromRow)]
pub struct VisitorEntity {
    pub id: Uuid,
    pub full_name: String,
    pub contact_number: String,
    pub email: String,
    pub purpose: String,
    pub host_id: Uuid,
    pub host_name: String,
    pub host_department: String,
    pub company_name: Option<String>,
    pub photo: Option<String>,
    pub badge_number: String,
    pub status: VisitorStatusDb,
    pub check_in_time: Option<DateTime<Utc>>,
    pub check_out_time: Option<DateTime<Utc>>,
    pub approval_time: Option<DateTime<Utc>>,
    pub approved_by: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<VisitorEntity> for Visitor {
    fn from(entity: VisitorEntity) -> Self {
        Self {
            id: entity.id,
            full_name: entity.full_name,
            contact_number: entity.contact_number,
            email: entity.email,
            purpose: entity.purpose,
            host_id: entity.host_id,
            host_name: entity.host_name,
            host_department: entity.host_department,
            company_name: entity.company_name,
            photo: entity.photo,
            badge_number: entity.badge_number,
            status: entity.status.into(),
            check_in_time: entity.check_in_time,
            check_out_time: entity.check_out_time,
            approval_time: entity.approval_time,
            approved_by: entity.approved_by,
            created_at: entity.created_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_visitor_status_db_round_trip() {
        for status in [
            VisitorStatus::Pending,
            VisitorStatus::Approved,
            VisitorStatus::Rejected,
            VisitorStatus::CheckedIn,
            VisitorStatus::CheckedOut,
        ] {
            let db: VisitorStatusDb = status.into();
            let back: VisitorStatus = db.into();
            assert_eq!(back, status);
        }
    }
}
