//! Activity repository for database operations.
//!
//! The proximity queries share one SQL distance fragment so the page and its
//! total count can never disagree on the filter. Subscription helpers run on
//! a caller-provided transaction connection so the check-then-act sequence
//! can hold a row lock on the activity.

use chrono::{NaiveDate, NaiveTime};
use sqlx::{PgConnection, PgPool};
use uuid::Uuid;

use crate::entities::{AtividadeDetalheRow, AtividadeEntity};
use crate::metrics::QueryTimer;

const ATIVIDADE_COLUMNS: &str = "id, criador_id, modalidade_id, titulo, observacoes, data, \
     horario, cep, uf, street, latitude, longitude, capacidade, sem_limite, status, \
     criado_em, atualizado_em";

const DETALHE_COLUMNS: &str = "a.id, a.criador_id, u.name AS criador_nome, a.modalidade_id, \
     m.nome AS modalidade_nome, a.titulo, a.observacoes, a.data, a.horario, a.cep, a.uf, \
     a.street, a.latitude, a.longitude, a.capacidade, a.sem_limite, a.status, \
     (SELECT COUNT(*) FROM atividade_participantes p WHERE p.atividade_id = a.id) \
         AS participantes_count, \
     a.criado_em, a.atualizado_em";

const DETALHE_FROM: &str = "FROM atividade a \
     JOIN usuarios u ON u.id = a.criador_id \
     JOIN modalidade m ON m.id = a.modalidade_id";

/// Great-circle distance in km between the query point ($1 latitude,
/// $2 longitude, degrees) and the activity row. The cosine sum is clamped to
/// [-1, 1]: floating rounding can push co-located points just outside the
/// acos domain.
const DISTANCIA_KM_SQL: &str = "(6371.0 * acos(LEAST(1.0, GREATEST(-1.0, \
     cos(radians($1)) * cos(radians(a.latitude)) * cos(radians(a.longitude) - radians($2)) \
     + sin(radians($1)) * sin(radians(a.latitude))))))";

/// Parameters for inserting a new activity.
#[derive(Debug)]
pub struct NewAtividade<'a> {
    pub criador_id: Uuid,
    pub modalidade_id: i64,
    pub titulo: &'a str,
    pub observacoes: Option<&'a str>,
    pub data: NaiveDate,
    pub horario: NaiveTime,
    pub cep: &'a str,
    pub uf: &'a str,
    pub street: &'a str,
    pub latitude: f64,
    pub longitude: f64,
    pub capacidade: Option<i32>,
    pub sem_limite: bool,
    pub status: &'a str,
}

/// Repository for activity-related database operations.
#[derive(Clone)]
pub struct AtividadeRepository {
    pool: PgPool,
}

impl AtividadeRepository {
    /// Creates a new AtividadeRepository with the given connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Returns a reference to the connection pool.
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Insert an activity and its creator-participant row in one
    /// transaction.
    pub async fn create(&self, new: NewAtividade<'_>) -> Result<AtividadeEntity, sqlx::Error> {
        let timer = QueryTimer::new("create_atividade");
        let mut tx = self.pool.begin().await?;

        let atividade = sqlx::query_as::<_, AtividadeEntity>(&format!(
            r#"
            INSERT INTO atividade (criador_id, modalidade_id, titulo, observacoes, data, horario,
                                   cep, uf, street, latitude, longitude, capacidade, sem_limite,
                                   status)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14)
            RETURNING {ATIVIDADE_COLUMNS}
            "#
        ))
        .bind(new.criador_id)
        .bind(new.modalidade_id)
        .bind(new.titulo)
        .bind(new.observacoes)
        .bind(new.data)
        .bind(new.horario)
        .bind(new.cep)
        .bind(new.uf)
        .bind(new.street)
        .bind(new.latitude)
        .bind(new.longitude)
        .bind(new.capacidade)
        .bind(new.sem_limite)
        .bind(new.status)
        .fetch_one(&mut *tx)
        .await?;

        sqlx::query(
            "INSERT INTO atividade_participantes (atividade_id, usuario_id) VALUES ($1, $2)",
        )
        .bind(atividade.id)
        .bind(new.criador_id)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        timer.record();
        Ok(atividade)
    }

    /// Find an activity by ID.
    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<AtividadeEntity>, sqlx::Error> {
        let timer = QueryTimer::new("find_atividade_by_id");
        let result = sqlx::query_as::<_, AtividadeEntity>(&format!(
            "SELECT {ATIVIDADE_COLUMNS} FROM atividade WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Find an activity joined with creator, modalidade and participant
    /// count.
    pub async fn find_detalhe_by_id(
        &self,
        id: Uuid,
    ) -> Result<Option<AtividadeDetalheRow>, sqlx::Error> {
        let timer = QueryTimer::new("find_atividade_detalhe");
        let result = sqlx::query_as::<_, AtividadeDetalheRow>(&format!(
            "SELECT {DETALHE_COLUMNS} {DETALHE_FROM} WHERE a.id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Update the mutable columns of an activity and bump `atualizado_em`.
    pub async fn update(&self, atividade: &AtividadeEntity) -> Result<(), sqlx::Error> {
        let timer = QueryTimer::new("update_atividade");
        sqlx::query(
            r#"
            UPDATE atividade
            SET titulo = $1, observacoes = $2, data = $3, horario = $4, cep = $5, uf = $6,
                street = $7, capacidade = $8, sem_limite = $9, status = $10,
                atualizado_em = NOW()
            WHERE id = $11
            "#,
        )
        .bind(&atividade.titulo)
        .bind(&atividade.observacoes)
        .bind(atividade.data)
        .bind(atividade.horario)
        .bind(&atividade.cep)
        .bind(&atividade.uf)
        .bind(&atividade.street)
        .bind(atividade.capacidade)
        .bind(atividade.sem_limite)
        .bind(&atividade.status)
        .bind(atividade.id)
        .execute(&self.pool)
        .await?;
        timer.record();
        Ok(())
    }

    /// Delete an activity. Participant rows go via FK cascade.
    pub async fn delete(&self, id: Uuid) -> Result<(), sqlx::Error> {
        let timer = QueryTimer::new("delete_atividade");
        sqlx::query("DELETE FROM atividade WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        timer.record();
        Ok(())
    }

    /// Delete every activity created by a user. Used by account deletion,
    /// which must remove dependents before the user row.
    pub async fn delete_by_criador(&self, criador_id: Uuid) -> Result<u64, sqlx::Error> {
        let timer = QueryTimer::new("delete_atividades_by_criador");
        let result = sqlx::query("DELETE FROM atividade WHERE criador_id = $1")
            .bind(criador_id)
            .execute(&self.pool)
            .await?;
        timer.record();
        Ok(result.rows_affected())
    }

    /// Default-ordered page of activities (soonest first).
    pub async fn find_all_paginated(
        &self,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<AtividadeDetalheRow>, sqlx::Error> {
        let timer = QueryTimer::new("find_atividades_paginated");
        let result = sqlx::query_as::<_, AtividadeDetalheRow>(&format!(
            "SELECT {DETALHE_COLUMNS} {DETALHE_FROM} \
             ORDER BY a.data, a.horario, a.id LIMIT $1 OFFSET $2"
        ))
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Total number of activities.
    pub async fn count_all(&self) -> Result<i64, sqlx::Error> {
        let timer = QueryTimer::new("count_atividades");
        let result = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM atividade")
            .fetch_one(&self.pool)
            .await;
        timer.record();
        result
    }

    /// Page of activities within `raio_km` of the query point, closest
    /// first.
    pub async fn find_nearby_paginated(
        &self,
        latitude: f64,
        longitude: f64,
        raio_km: f64,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<AtividadeDetalheRow>, sqlx::Error> {
        let timer = QueryTimer::new("find_atividades_proximas");
        let result = sqlx::query_as::<_, AtividadeDetalheRow>(&format!(
            "SELECT {DETALHE_COLUMNS}, {DISTANCIA_KM_SQL} AS distancia_km {DETALHE_FROM} \
             WHERE {DISTANCIA_KM_SQL} < $3 \
             ORDER BY distancia_km, a.id LIMIT $4 OFFSET $5"
        ))
        .bind(latitude)
        .bind(longitude)
        .bind(raio_km)
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Count of activities within `raio_km`, using the identical predicate
    /// as [`find_nearby_paginated`](Self::find_nearby_paginated).
    pub async fn count_nearby(
        &self,
        latitude: f64,
        longitude: f64,
        raio_km: f64,
    ) -> Result<i64, sqlx::Error> {
        let timer = QueryTimer::new("count_atividades_proximas");
        let result = sqlx::query_scalar::<_, i64>(&format!(
            "SELECT COUNT(*) FROM atividade a WHERE {DISTANCIA_KM_SQL} < $3"
        ))
        .bind(latitude)
        .bind(longitude)
        .bind(raio_km)
        .fetch_one(&self.pool)
        .await;
        timer.record();
        result
    }

    // ------------------------------------------------------------------
    // Subscription helpers. All run on the caller's transaction so the
    // FOR UPDATE lock below serializes concurrent subscribers.
    // ------------------------------------------------------------------

    /// Load an activity and lock its row until the transaction ends.
    pub async fn find_for_update(
        &self,
        conn: &mut PgConnection,
        id: Uuid,
    ) -> Result<Option<AtividadeEntity>, sqlx::Error> {
        let timer = QueryTimer::new("find_atividade_for_update");
        let result = sqlx::query_as::<_, AtividadeEntity>(&format!(
            "SELECT {ATIVIDADE_COLUMNS} FROM atividade WHERE id = $1 FOR UPDATE"
        ))
        .bind(id)
        .fetch_optional(conn)
        .await;
        timer.record();
        result
    }

    /// Current participant count of an activity.
    pub async fn count_participantes(
        &self,
        conn: &mut PgConnection,
        atividade_id: Uuid,
    ) -> Result<i64, sqlx::Error> {
        let timer = QueryTimer::new("count_participantes");
        let result = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM atividade_participantes WHERE atividade_id = $1",
        )
        .bind(atividade_id)
        .fetch_one(conn)
        .await;
        timer.record();
        result
    }

    /// Whether a user already participates in an activity.
    pub async fn is_participante(
        &self,
        conn: &mut PgConnection,
        atividade_id: Uuid,
        usuario_id: Uuid,
    ) -> Result<bool, sqlx::Error> {
        let timer = QueryTimer::new("is_participante");
        let result = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS( \
                 SELECT 1 FROM atividade_participantes \
                 WHERE atividade_id = $1 AND usuario_id = $2)",
        )
        .bind(atividade_id)
        .bind(usuario_id)
        .fetch_one(conn)
        .await;
        timer.record();
        result
    }

    /// Add a participant to an activity.
    pub async fn add_participante(
        &self,
        conn: &mut PgConnection,
        atividade_id: Uuid,
        usuario_id: Uuid,
    ) -> Result<(), sqlx::Error> {
        let timer = QueryTimer::new("add_participante");
        sqlx::query(
            "INSERT INTO atividade_participantes (atividade_id, usuario_id) VALUES ($1, $2)",
        )
        .bind(atividade_id)
        .bind(usuario_id)
        .execute(conn)
        .await?;
        timer.record();
        Ok(())
    }

    /// Set an activity's status and bump `atualizado_em`.
    pub async fn set_status(
        &self,
        conn: &mut PgConnection,
        atividade_id: Uuid,
        status: &str,
    ) -> Result<(), sqlx::Error> {
        let timer = QueryTimer::new("set_atividade_status");
        sqlx::query("UPDATE atividade SET status = $1, atualizado_em = NOW() WHERE id = $2")
            .bind(status)
            .bind(atividade_id)
            .execute(conn)
            .await?;
        timer.record();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_distance_fragment_is_shared_by_page_and_count() {
        // Both nearby queries must filter on the exact same expression.
        let page = format!(
            "SELECT {DETALHE_COLUMNS}, {DISTANCIA_KM_SQL} AS distancia_km {DETALHE_FROM} \
             WHERE {DISTANCIA_KM_SQL} < $3 \
             ORDER BY distancia_km, a.id LIMIT $4 OFFSET $5"
        );
        let count = format!("SELECT COUNT(*) FROM atividade a WHERE {DISTANCIA_KM_SQL} < $3");

        let predicate = format!("WHERE {DISTANCIA_KM_SQL} < $3");
        assert!(page.contains(&predicate));
        assert!(count.contains(&predicate));
    }

    #[test]
    fn test_distance_fragment_clamps_acos_domain() {
        assert!(DISTANCIA_KM_SQL.contains("LEAST(1.0"));
        assert!(DISTANCIA_KM_SQL.contains("GREATEST(-1.0"));
        assert!(DISTANCIA_KM_SQL.contains("6371.0"));
    }
}
