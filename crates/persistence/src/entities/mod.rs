//! Entity definitions mapping database rows.

pub mod atividade;
pub mod modalidade;
pub mod usuario;

pub use atividade::{AtividadeDetalheRow, AtividadeEntity};
pub use modalidade::ModalidadeEntity;
pub use usuario::UsuarioEntity;
