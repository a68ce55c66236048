//! HTTP route handlers.

pub mod dashboard;
pub mod health;
pub mod passes;
pub mod pre_approvals;
pub mod visitors;
