//! User repository for database operations.
//!
//! Email and username lookups are case-insensitive; the unique indexes on
//! `LOWER(email)` / `LOWER(user_name)` back the same rule in the schema.

use chrono::NaiveDate;
use sqlx::PgPool;
use uuid::Uuid;

use crate::entities::UsuarioEntity;
use crate::metrics::QueryTimer;

const USUARIO_COLUMNS: &str = "id, name, genero, user_name, email, data_nascimento, password, \
     phone, cep, uf, street, data_cadastro";

/// Parameters for inserting a new user.
#[derive(Debug)]
pub struct NewUsuario<'a> {
    pub name: &'a str,
    pub genero: &'a str,
    pub username: &'a str,
    pub email: &'a str,
    pub data_nascimento: NaiveDate,
    pub password_hash: &'a str,
    pub phone: &'a str,
    pub cep: &'a str,
    pub uf: &'a str,
    pub street: &'a str,
}

/// Repository for user-related database operations.
#[derive(Clone)]
pub struct UsuarioRepository {
    pool: PgPool,
}

impl UsuarioRepository {
    /// Creates a new UsuarioRepository with the given connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Returns a reference to the connection pool.
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Find a user by ID.
    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<UsuarioEntity>, sqlx::Error> {
        let timer = QueryTimer::new("find_usuario_by_id");
        let result = sqlx::query_as::<_, UsuarioEntity>(&format!(
            "SELECT {USUARIO_COLUMNS} FROM usuarios WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Find a user by username, ignoring case.
    pub async fn find_by_username(
        &self,
        username: &str,
    ) -> Result<Option<UsuarioEntity>, sqlx::Error> {
        let timer = QueryTimer::new("find_usuario_by_username");
        let result = sqlx::query_as::<_, UsuarioEntity>(&format!(
            "SELECT {USUARIO_COLUMNS} FROM usuarios WHERE LOWER(user_name) = LOWER($1)"
        ))
        .bind(username)
        .fetch_optional(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Find a user by email address, ignoring case.
    pub async fn find_by_email(&self, email: &str) -> Result<Option<UsuarioEntity>, sqlx::Error> {
        let timer = QueryTimer::new("find_usuario_by_email");
        let result = sqlx::query_as::<_, UsuarioEntity>(&format!(
            "SELECT {USUARIO_COLUMNS} FROM usuarios WHERE LOWER(email) = LOWER($1)"
        ))
        .bind(email)
        .fetch_optional(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Create a user and its modalidade links in one transaction.
    pub async fn create(
        &self,
        new: NewUsuario<'_>,
        modalidade_ids: &[i64],
    ) -> Result<UsuarioEntity, sqlx::Error> {
        let timer = QueryTimer::new("create_usuario");
        let mut tx = self.pool.begin().await?;

        let user = sqlx::query_as::<_, UsuarioEntity>(&format!(
            r#"
            INSERT INTO usuarios (name, genero, user_name, email, data_nascimento, password,
                                  phone, cep, uf, street)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            RETURNING {USUARIO_COLUMNS}
            "#
        ))
        .bind(new.name)
        .bind(new.genero)
        .bind(new.username)
        .bind(new.email)
        .bind(new.data_nascimento)
        .bind(new.password_hash)
        .bind(new.phone)
        .bind(new.cep)
        .bind(new.uf)
        .bind(new.street)
        .fetch_one(&mut *tx)
        .await?;

        for modalidade_id in modalidade_ids {
            sqlx::query(
                "INSERT INTO user_modalidade (user_id, modalidade_id) VALUES ($1, $2)",
            )
            .bind(user.id)
            .bind(modalidade_id)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        timer.record();
        Ok(user)
    }

    /// Update the mutable profile columns of a user.
    pub async fn update(&self, user: &UsuarioEntity) -> Result<(), sqlx::Error> {
        let timer = QueryTimer::new("update_usuario");
        sqlx::query(
            r#"
            UPDATE usuarios
            SET name = $1, genero = $2, data_nascimento = $3, password = $4,
                phone = $5, cep = $6, uf = $7, street = $8
            WHERE id = $9
            "#,
        )
        .bind(&user.name)
        .bind(&user.genero)
        .bind(user.data_nascimento)
        .bind(&user.password)
        .bind(&user.phone)
        .bind(&user.cep)
        .bind(&user.uf)
        .bind(&user.street)
        .bind(user.id)
        .execute(&self.pool)
        .await?;
        timer.record();
        Ok(())
    }

    /// Replace the user's modalidade set.
    pub async fn set_modalidades(
        &self,
        user_id: Uuid,
        modalidade_ids: &[i64],
    ) -> Result<(), sqlx::Error> {
        let timer = QueryTimer::new("set_usuario_modalidades");
        let mut tx = self.pool.begin().await?;

        sqlx::query("DELETE FROM user_modalidade WHERE user_id = $1")
            .bind(user_id)
            .execute(&mut *tx)
            .await?;

        for modalidade_id in modalidade_ids {
            sqlx::query(
                "INSERT INTO user_modalidade (user_id, modalidade_id) VALUES ($1, $2)",
            )
            .bind(user_id)
            .bind(modalidade_id)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        timer.record();
        Ok(())
    }

    /// Names of the modalidades linked to a user, alphabetically.
    pub async fn modalidades_nomes(&self, user_id: Uuid) -> Result<Vec<String>, sqlx::Error> {
        let timer = QueryTimer::new("find_usuario_modalidades");
        let result = sqlx::query_scalar::<_, String>(
            r#"
            SELECT m.nome
            FROM user_modalidade um
            JOIN modalidade m ON m.id = um.modalidade_id
            WHERE um.user_id = $1
            ORDER BY m.nome
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Page of users in registration order.
    pub async fn find_all_paginated(
        &self,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<UsuarioEntity>, sqlx::Error> {
        let timer = QueryTimer::new("find_usuarios_paginated");
        let result = sqlx::query_as::<_, UsuarioEntity>(&format!(
            "SELECT {USUARIO_COLUMNS} FROM usuarios ORDER BY data_cadastro, id LIMIT $1 OFFSET $2"
        ))
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Total number of users.
    pub async fn count_all(&self) -> Result<i64, sqlx::Error> {
        let timer = QueryTimer::new("count_usuarios");
        let result = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM usuarios")
            .fetch_one(&self.pool)
            .await;
        timer.record();
        result
    }

    /// Delete a user. Junction rows go via FK cascade; activities created by
    /// the user must have been deleted beforehand.
    pub async fn delete(&self, id: Uuid) -> Result<(), sqlx::Error> {
        let timer = QueryTimer::new("delete_usuario");
        sqlx::query("DELETE FROM usuarios WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        timer.record();
        Ok(())
    }
}
