//! Pre-approval repository for database operations.

use chrono::{DateTime, NaiveDate, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::entities::{DeliveryStatusDb, PreApprovalEntity, PreApprovalStatsEntity};
use crate::metrics::QueryTimer;

const ENTRY_COLUMNS: &str = "id, visitor_name, visitor_email, visitor_phone, purpose, \
     scheduled_date, start_time, end_time, host_id, host_name, status, qr_code, \
     qr_sent, qr_sent_at, qr_sent_status, valid_until, created_at";

/// Fields of a new pre-approval row.
#[derive(Debug, Clone)]
pub struct NewPreApprovalRecord {
    pub visitor_name: String,
    pub visitor_email: String,
    pub visitor_phone: String,
    pub purpose: String,
    pub scheduled_date: NaiveDate,
    pub start_time: String,
    pub end_time: String,
    pub host_id: Uuid,
    pub host_name: String,
    pub qr_code: String,
    pub valid_until: DateTime<Utc>,
}

/// Repository for pre-approval database operations.
#[derive(Clone)]
pub struct PreApprovalRepository {
    pool: PgPool,
}

impl PreApprovalRepository {
    /// Creates a new PreApprovalRepository with the given connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Returns a reference to the connection pool.
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Create a new entry: status active, delivery sub-state not_sent.
    pub async fn create(
        &self,
        record: NewPreApprovalRecord,
    ) -> Result<PreApprovalEntity, sqlx::Error> {
        let timer = QueryTimer::new("create_pre_approval");
        let result = sqlx::query_as::<_, PreApprovalEntity>(&format!(
            r#"
            INSERT INTO pre_approvals
                (visitor_name, visitor_email, visitor_phone, purpose, scheduled_date,
                 start_time, end_time, host_id, host_name, qr_code, valid_until)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            RETURNING {ENTRY_COLUMNS}
            "#,
        ))
        .bind(&record.visitor_name)
        .bind(&record.visitor_email)
        .bind(&record.visitor_phone)
        .bind(&record.purpose)
        .bind(record.scheduled_date)
        .bind(&record.start_time)
        .bind(&record.end_time)
        .bind(record.host_id)
        .bind(&record.host_name)
        .bind(&record.qr_code)
        .bind(record.valid_until)
        .fetch_one(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Find an entry by ID.
    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<PreApprovalEntity>, sqlx::Error> {
        let timer = QueryTimer::new("find_pre_approval_by_id");
        let result = sqlx::query_as::<_, PreApprovalEntity>(&format!(
            "SELECT {ENTRY_COLUMNS} FROM pre_approvals WHERE id = $1",
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await;
        timer.record();
        result
    }

    /// List every entry, newest first (administrator view).
    pub async fn list_all(&self) -> Result<Vec<PreApprovalEntity>, sqlx::Error> {
        let timer = QueryTimer::new("list_pre_approvals");
        let result = sqlx::query_as::<_, PreApprovalEntity>(&format!(
            "SELECT {ENTRY_COLUMNS} FROM pre_approvals ORDER BY created_at DESC",
        ))
        .fetch_all(&self.pool)
        .await;
        timer.record();
        result
    }

    /// List entries created by one host, newest first.
    pub async fn list_for_host(
        &self,
        host_id: Uuid,
    ) -> Result<Vec<PreApprovalEntity>, sqlx::Error> {
        let timer = QueryTimer::new("list_pre_approvals_for_host");
        let result = sqlx::query_as::<_, PreApprovalEntity>(&format!(
            "SELECT {ENTRY_COLUMNS} FROM pre_approvals WHERE host_id = $1 ORDER BY created_at DESC",
        ))
        .bind(host_id)
        .fetch_all(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Summary counters, optionally scoped to one host.
    pub async fn stats(
        &self,
        host_id: Option<Uuid>,
    ) -> Result<PreApprovalStatsEntity, sqlx::Error> {
        let timer = QueryTimer::new("pre_approval_stats");
        let result = sqlx::query_as::<_, PreApprovalStatsEntity>(
            r#"
            SELECT
                COUNT(*) AS total,
                COUNT(*) FILTER (WHERE qr_sent_status = 'sent') AS sent,
                COUNT(*) FILTER (WHERE status = 'active') AS active
            FROM pre_approvals
            WHERE ($1::uuid IS NULL OR host_id = $1)
            "#,
        )
        .bind(host_id)
        .fetch_one(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Atomically move an entry into `sending`.
    ///
    /// Returns the claimed row, or None when the entry is already mid-send
    /// (duplicate submission guard). Any resting state may start a send.
    pub async fn begin_send(&self, id: Uuid) -> Result<Option<PreApprovalEntity>, sqlx::Error> {
        let timer = QueryTimer::new("begin_pre_approval_send");
        let result = sqlx::query_as::<_, PreApprovalEntity>(&format!(
            r#"
            UPDATE pre_approvals
            SET qr_sent_status = 'sending'
            WHERE id = $1 AND qr_sent_status <> 'sending'
            RETURNING {ENTRY_COLUMNS}
            "#,
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Idempotent write of the delivery sub-state.
    ///
    /// `qr_sent` and `qr_sent_at` are derived from the status so the
    /// "sent_at is set iff status is sent" invariant cannot be violated by
    /// a caller. Concurrent writers are last-write-wins; sending a pass is
    /// a manual, low-frequency action.
    pub async fn update_delivery_status(
        &self,
        id: Uuid,
        status: DeliveryStatusDb,
        sent_at: Option<DateTime<Utc>>,
    ) -> Result<u64, sqlx::Error> {
        let sent_at = match status {
            DeliveryStatusDb::Sent => sent_at,
            _ => None,
        };
        let timer = QueryTimer::new("update_pre_approval_delivery_status");
        let result = sqlx::query(
            r#"
            UPDATE pre_approvals
            SET qr_sent_status = $2,
                qr_sent = ($2 = 'sent'::delivery_status),
                qr_sent_at = $3
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(status)
        .bind(sent_at)
        .execute(&self.pool)
        .await?;
        timer.record();
        Ok(result.rows_affected())
    }

    /// Flip every active entry whose validity window has closed to expired.
    ///
    /// Run lazily before reads; there is no background sweeper.
    pub async fn expire_overdue(&self, now: DateTime<Utc>) -> Result<u64, sqlx::Error> {
        let timer = QueryTimer::new("expire_overdue_pre_approvals");
        let result = sqlx::query(
            r#"
            UPDATE pre_approvals
            SET status = 'expired'
            WHERE status = 'active' AND valid_until < $1
            "#,
        )
        .bind(now)
        .execute(&self.pool)
        .await?;
        timer.record();
        Ok(result.rows_affected())
    }

    /// Mark an active entry as used (visitor admitted at the gate).
    ///
    /// Returns None when the entry is not active anymore.
    pub async fn mark_used(&self, id: Uuid) -> Result<Option<PreApprovalEntity>, sqlx::Error> {
        let timer = QueryTimer::new("mark_pre_approval_used");
        let result = sqlx::query_as::<_, PreApprovalEntity>(&format!(
            r#"
            UPDATE pre_approvals
            SET status = 'used'
            WHERE id = $1 AND status = 'active'
            RETURNING {ENTRY_COLUMNS}
            "#,
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await;
        timer.record();
        result
    }
}

#[cfg(test)]
mod tests {
    // Note: PreApprovalRepository tests require a database connection and are
    // covered by the integration tests.
}
