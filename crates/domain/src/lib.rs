//! Domain layer for the Quadra backend.
//!
//! This crate contains:
//! - Domain models (User, Modalidade, Atividade) with their request and
//!   response payloads and explicit partial-update merges
//! - Pure business decision services (subscription rules)

pub mod models;
pub mod services;
