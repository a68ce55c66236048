//! Dashboard counter DTOs.

use serde::Serialize;

/// Summary counters shown on the landing screen.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct DashboardSummary {
    /// Visitors registered today
    pub visitors_today: i64,
    /// Visitors currently on the premises
    pub checked_in: i64,
    /// Walk-ins awaiting a host decision
    pub pending_approvals: i64,
    /// Pre-approvals still inside their validity window
    pub active_pre_approvals: i64,
    /// Passes successfully emailed
    pub passes_sent: i64,
}
