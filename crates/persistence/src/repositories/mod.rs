//! Repository implementations for database operations.

pub mod pre_approval;
pub mod visitor;

pub use pre_approval::{NewPreApprovalRecord, PreApprovalRepository};
pub use visitor::{NewVisitorRecord, VisitorRepository};
