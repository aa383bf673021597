//! Persistence layer for the Quadra backend.
//!
//! This crate contains:
//! - Database connection management
//! - Entity definitions (database row mappings)
//! - Repository implementations
//! - Embedded schema migrations

pub mod db;
pub mod entities;
pub mod metrics;
pub mod repositories;
