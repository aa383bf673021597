//! Orchestration services: the engines behind the HTTP handlers.

pub mod atividades;
pub mod geocoding;
pub mod usuarios;

pub use atividades::{AtividadeService, AtividadeServiceError};
pub use geocoding::{Coordenadas, GeocodingClient};
pub use usuarios::{UsuarioService, UsuarioServiceError};
