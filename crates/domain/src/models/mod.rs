//! Domain model definitions.

pub mod dashboard;
pub mod pass;
pub mod pre_approval;
pub mod user;
pub mod visitor;
