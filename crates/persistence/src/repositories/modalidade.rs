//! Modalidade repository. Read-only reference data.

use sqlx::PgPool;

use crate::entities::ModalidadeEntity;
use crate::metrics::QueryTimer;

/// Repository for modalidade lookups.
#[derive(Clone)]
pub struct ModalidadeRepository {
    pool: PgPool,
}

impl ModalidadeRepository {
    /// Creates a new ModalidadeRepository with the given connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// All modalidades, alphabetically.
    pub async fn find_all(&self) -> Result<Vec<ModalidadeEntity>, sqlx::Error> {
        let timer = QueryTimer::new("find_modalidades");
        let result = sqlx::query_as::<_, ModalidadeEntity>(
            "SELECT id, nome FROM modalidade ORDER BY nome",
        )
        .fetch_all(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Find one modalidade by exact name.
    pub async fn find_by_nome(
        &self,
        nome: &str,
    ) -> Result<Option<ModalidadeEntity>, sqlx::Error> {
        let timer = QueryTimer::new("find_modalidade_by_nome");
        let result = sqlx::query_as::<_, ModalidadeEntity>(
            "SELECT id, nome FROM modalidade WHERE nome = $1",
        )
        .bind(nome)
        .fetch_optional(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Find every modalidade whose name is in `nomes`.
    ///
    /// Callers compare the result length against the request length to
    /// detect unknown names.
    pub async fn find_by_nomes(
        &self,
        nomes: &[String],
    ) -> Result<Vec<ModalidadeEntity>, sqlx::Error> {
        let timer = QueryTimer::new("find_modalidades_by_nomes");
        let result = sqlx::query_as::<_, ModalidadeEntity>(
            "SELECT id, nome FROM modalidade WHERE nome = ANY($1)",
        )
        .bind(nomes)
        .fetch_all(&self.pool)
        .await;
        timer.record();
        result
    }
}
