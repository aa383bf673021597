//! User entity mapping the `usuarios` table.

use chrono::{DateTime, NaiveDate, Utc};
use sqlx::FromRow;
use uuid::Uuid;

/// Database row for a user.
///
/// `genero` is stored as its uppercase string form; `password` is an Argon2
/// PHC hash.
#[derive(Debug, Clone, FromRow)]
pub struct UsuarioEntity {
    pub id: Uuid,
    pub name: String,
    pub genero: String,
    pub user_name: String,
    pub email: String,
    pub data_nascimento: NaiveDate,
    pub password: String,
    pub phone: String,
    pub cep: String,
    pub uf: String,
    pub street: String,
    pub data_cadastro: DateTime<Utc>,
}
