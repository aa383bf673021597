//! Shared utilities and common types for the Quadra backend.
//!
//! This crate provides common functionality used across all other crates:
//! - JWT issuance and verification
//! - Password hashing with Argon2id
//! - Offset pagination types
//! - Common validation logic and normalizers

pub mod jwt;
pub mod pagination;
pub mod password;
pub mod validation;
