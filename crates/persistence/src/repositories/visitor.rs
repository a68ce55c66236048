//! Visitor repository for database operations.

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::entities::{VisitorEntity, VisitorStatusDb};
use crate::metrics::QueryTimer;

const VISITOR_COLUMNS: &str = "id, full_name, contact_number, email, purpose, host_id, \
     host_name, host_department, company_name, photo, badge_number, status, \
     check_in_time, check_out_time, approval_time, approved_by, created_at";

/// Fields of a new visitor row.
#[derive(Debug, Clone)]
pub struct NewVisitorRecord {
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
}

/// Repository for visitor database operations.
#[derive(Clone)]
pub struct VisitorRepository {
    pool: PgPool,
}

impl VisitorRepository {
    /// Creates a new VisitorRepository with the given connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Register a walk-in visitor: status pending, badge pre-assigned.
    pub async fn create(&self, record: NewVisitorRecord) -> Result<VisitorEntity, sqlx::Error> {
        let timer = QueryTimer::new("create_visitor");
        let result = sqlx::query_as::<_, VisitorEntity>(&format!(
            r#"
            INSERT INTO visitors
                (full_name, contact_number, email, purpose, host_id, host_name,
                 host_department, company_name, photo, badge_number)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            RETURNING {VISITOR_COLUMNS}
            "#,
        ))
        .bind(&record.full_name)
        .bind(&record.contact_number)
        .bind(&record.email)
        .bind(&record.purpose)
        .bind(record.host_id)
        .bind(&record.host_name)
        .bind(&record.host_department)
        .bind(&record.company_name)
        .bind(&record.photo)
        .bind(&record.badge_number)
        .fetch_one(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Find a visitor by ID.
    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<VisitorEntity>, sqlx::Error> {
        let timer = QueryTimer::new("find_visitor_by_id");
        let result = sqlx::query_as::<_, VisitorEntity>(&format!(
            "SELECT {VISITOR_COLUMNS} FROM visitors WHERE id = $1",
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Directory listing with optional status and name/badge search filters,
    /// newest first.
    pub async fn list(
        &self,
        status: Option<VisitorStatusDb>,
        search: Option<&str>,
    ) -> Result<Vec<VisitorEntity>, sqlx::Error> {
        let pattern = search.map(|s| format!("%{s}%"));
        let timer = QueryTimer::new("list_visitors");
        let result = sqlx::query_as::<_, VisitorEntity>(&format!(
            r#"
            SELECT {VISITOR_COLUMNS} FROM visitors
            WHERE ($1::visitor_status IS NULL OR status = $1)
              AND ($2::text IS NULL OR full_name ILIKE $2 OR badge_number ILIKE $2)
            ORDER BY created_at DESC
            "#,
        ))
        .bind(status)
        .bind(pattern)
        .fetch_all(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Pending approvals, oldest first, optionally scoped to one host.
    pub async fn list_pending(
        &self,
        host_id: Option<Uuid>,
    ) -> Result<Vec<VisitorEntity>, sqlx::Error> {
        let timer = QueryTimer::new("list_pending_visitors");
        let result = sqlx::query_as::<_, VisitorEntity>(&format!(
            r#"
            SELECT {VISITOR_COLUMNS} FROM visitors
            WHERE status = 'pending' AND ($1::uuid IS NULL OR host_id = $1)
            ORDER BY created_at ASC
            "#,
        ))
        .bind(host_id)
        .fetch_all(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Approve a pending visitor. Returns None when the visitor is not
    /// awaiting a decision.
    pub async fn approve(
        &self,
        id: Uuid,
        approved_by: &str,
        now: DateTime<Utc>,
    ) -> Result<Option<VisitorEntity>, sqlx::Error> {
        let timer = QueryTimer::new("approve_visitor");
        let result = sqlx::query_as::<_, VisitorEntity>(&format!(
            r#"
            UPDATE visitors
            SET status = 'approved', approval_time = $3, approved_by = $2
            WHERE id = $1 AND status = 'pending'
            RETURNING {VISITOR_COLUMNS}
            "#,
        ))
        .bind(id)
        .bind(approved_by)
        .bind(now)
        .fetch_optional(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Reject a pending visitor. Returns None when the visitor is not
    /// awaiting a decision.
    pub async fn reject(
        &self,
        id: Uuid,
        rejected_by: &str,
        now: DateTime<Utc>,
    ) -> Result<Option<VisitorEntity>, sqlx::Error> {
        let timer = QueryTimer::new("reject_visitor");
        let result = sqlx::query_as::<_, VisitorEntity>(&format!(
            r#"
            UPDATE visitors
            SET status = 'rejected', approval_time = $3, approved_by = $2
            WHERE id = $1 AND status = 'pending'
            RETURNING {VISITOR_COLUMNS}
            "#,
        ))
        .bind(id)
        .bind(rejected_by)
        .bind(now)
        .fetch_optional(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Check an approved visitor in at the gate. Returns None unless the
    /// visitor is currently approved.
    pub async fn check_in(
        &self,
        id: Uuid,
        now: DateTime<Utc>,
    ) -> Result<Option<VisitorEntity>, sqlx::Error> {
        let timer = QueryTimer::new("check_in_visitor");
        let result = sqlx::query_as::<_, VisitorEntity>(&format!(
            r#"
            UPDATE visitors
            SET status = 'checked_in', check_in_time = $2
            WHERE id = $1 AND status = 'approved'
            RETURNING {VISITOR_COLUMNS}
            "#,
        ))
        .bind(id)
        .bind(now)
        .fetch_optional(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Check a visitor out. Returns None unless the visitor is currently
    /// checked in.
    pub async fn check_out(
        &self,
        id: Uuid,
        now: DateTime<Utc>,
    ) -> Result<Option<VisitorEntity>, sqlx::Error> {
        let timer = QueryTimer::new("check_out_visitor");
        let result = sqlx::query_as::<_, VisitorEntity>(&format!(
            r#"
            UPDATE visitors
            SET status = 'checked_out', check_out_time = $2
            WHERE id = $1 AND status = 'checked_in'
            RETURNING {VISITOR_COLUMNS}
            "#,
        ))
        .bind(id)
        .bind(now)
        .fetch_optional(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Visitors registered on the given day (UTC), for the dashboard.
    pub async fn count_registered_on(&self, day: chrono::NaiveDate) -> Result<i64, sqlx::Error> {
        let timer = QueryTimer::new("count_visitors_registered_on");
        let result = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM visitors WHERE created_at::date = $1",
        )
        .bind(day)
        .fetch_one(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Visitors currently in a given status, for the dashboard.
    pub async fn count_with_status(&self, status: VisitorStatusDb) -> Result<i64, sqlx::Error> {
        let timer = QueryTimer::new("count_visitors_with_status");
        let result =
            sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM visitors WHERE status = $1")
                .bind(status)
                .fetch_one(&self.pool)
                .await;
        timer.record();
        result
    }
}
