//! Domain layer for the Visitor Gate backend.
//!
//! This crate contains:
//! - Domain models (PreApproval, Visitor, PassPayload)
//! - Request/response DTOs with validation
//! - Pass construction and verification logic

pub mod models;
