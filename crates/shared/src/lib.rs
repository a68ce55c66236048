//! Shared utilities and common types for the Visitor Gate backend.
//!
//! This crate provides common functionality used across all other crates:
//! - Pass signing and verification (keyed HMAC)
//! - JWT access-token validation
//! - Common validation logic

pub mod crypto;
pub mod jwt;
pub mod validation;
