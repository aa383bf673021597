//! Domain models.

pub mod atividade;
pub mod modalidade;
pub mod usuario;

pub use atividade::{
    Atividade, AtividadeResponse, CreateAtividadeRequest, StatusAtividade, UpdateAtividadeRequest,
};
pub use modalidade::{Modalidade, ModalidadeResponse};
pub use usuario::{
    Credential, Genero, RegisterUserRequest, UpdateUserRequest, User, UserResponse,
};
