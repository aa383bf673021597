//! Pure business decision services.

pub mod inscricao;

pub use inscricao::{avaliar_inscricao, InscricaoDecision, InscricaoError};
