//! Repository implementations.

pub mod atividade;
pub mod modalidade;
pub mod usuario;

pub use atividade::{AtividadeRepository, NewAtividade};
pub use modalidade::ModalidadeRepository;
pub use usuario::{NewUsuario, UsuarioRepository};
