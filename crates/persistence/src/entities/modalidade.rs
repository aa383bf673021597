//! Modalidade entity mapping the `modalidade` table.

use sqlx::FromRow;

/// Database row for a sport category.
#[derive(Debug, Clone, FromRow)]
pub struct ModalidadeEntity {
    pub id: i64,
    pub nome: String,
}
