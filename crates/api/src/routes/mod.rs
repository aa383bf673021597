//! HTTP route handlers.

pub mod atividades;
pub mod auth;
pub mod health;
pub mod modalidades;
pub mod users;
