//! Database entity definitions.
//!
//! Entities are direct mappings to database rows.

pub mod pre_approval;
pub mod visitor;

pub use pre_approval::{DeliveryStatusDb, PreApprovalEntity, PreApprovalStatsEntity, PreApprovalStatusDb};
pub use visitor::{VisitorEntity, VisitorStatusDb};
