//! Activity entities mapping the `atividade` table.

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use sqlx::FromRow;
use uuid::Uuid;

/// Bare database row for an activity.
#[derive(Debug, Clone, FromRow)]
pub struct AtividadeEntity {
    pub id: Uuid,
    pub criador_id: Uuid,
    pub modalidade_id: i64,
    pub titulo: String,
    pub observacoes: Option<String>,
    pub data: NaiveDate,
    pub horario: NaiveTime,
    pub cep: String,
    pub uf: String,
    pub street: String,
    pub latitude: f64,
    pub longitude: f64,
    pub capacidade: Option<i32>,
    pub sem_limite: bool,
    pub status: String,
    pub criado_em: DateTime<Utc>,
    pub atualizado_em: DateTime<Utc>,
}

/// Activity row joined with creator name, modalidade name and the current
/// participant count. This is what listing and detail queries return.
#[derive(Debug, Clone, FromRow)]
pub struct AtividadeDetalheRow {
    pub id: Uuid,
    pub criador_id: Uuid,
    pub criador_nome: String,
    pub modalidade_id: i64,
    pub modalidade_nome: String,
    pub titulo: String,
    pub observacoes: Option<String>,
    pub data: NaiveDate,
    pub horario: NaiveTime,
    pub cep: String,
    pub uf: String,
    pub street: String,
    pub latitude: f64,
    pub longitude: f64,
    pub capacidade: Option<i32>,
    pub sem_limite: bool,
    pub status: String,
    pub participantes_count: i64,
    pub criado_em: DateTime<Utc>,
    pub atualizado_em: DateTime<Utc>,
}
