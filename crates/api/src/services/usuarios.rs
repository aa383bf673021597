//! User registration, authentication and profile engine.

use sqlx::PgPool;
use tracing::info;

use domain::models::{
    Credential, Genero, RegisterUserRequest, UpdateUserRequest, User, UserResponse,
};
use persistence::entities::UsuarioEntity;
use persistence::repositories::{
    AtividadeRepository, ModalidadeRepository, NewUsuario, UsuarioRepository,
};
use shared::pagination::{Page, PageRequest};
use shared::password::{hash_password, verify_password, PasswordError};
use shared::validation::{normalize_cep, normalize_uf};
use thiserror::Error;

use crate::error::ApiError;

/// Errors produced by user operations.
#[derive(Debug, Error)]
pub enum UsuarioServiceError {
    #[error("Este e-mail já está em uso")]
    EmailTaken,

    #[error("Este nome de usuário já está em uso")]
    UsernameTaken,

    #[error("Uma ou mais modalidades informadas não existem")]
    ModalidadeInvalida,

    #[error("Credenciais inválidas")]
    InvalidCredentials,

    #[error("{0}")]
    NotFound(String),

    #[error("Password error: {0}")]
    Password(#[from] PasswordError),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<UsuarioServiceError> for ApiError {
    fn from(err: UsuarioServiceError) -> Self {
        match err {
            UsuarioServiceError::EmailTaken => ApiError::Conflict {
                code: "EMAIL_TAKEN",
                message: err.to_string(),
            },
            UsuarioServiceError::UsernameTaken => ApiError::Conflict {
                code: "USERNAME_TAKEN",
                message: err.to_string(),
            },
            UsuarioServiceError::ModalidadeInvalida => ApiError::BadRequest {
                code: "MODALIDADE_INVALIDA",
                message: err.to_string(),
            },
            UsuarioServiceError::InvalidCredentials => {
                ApiError::Unauthorized("Credenciais inválidas".to_string())
            }
            UsuarioServiceError::NotFound(msg) => ApiError::NotFound(msg),
            UsuarioServiceError::Password(e) => ApiError::Internal(e.to_string()),
            UsuarioServiceError::Database(e) => e.into(),
            UsuarioServiceError::Internal(msg) => ApiError::Internal(msg),
        }
    }
}

/// User registration and profile engine.
#[derive(Clone)]
pub struct UsuarioService {
    usuarios: UsuarioRepository,
    modalidades: ModalidadeRepository,
    atividades: AtividadeRepository,
}

impl UsuarioService {
    pub fn new(pool: PgPool) -> Self {
        Self {
            usuarios: UsuarioRepository::new(pool.clone()),
            modalidades: ModalidadeRepository::new(pool.clone()),
            atividades: AtividadeRepository::new(pool),
        }
    }

    /// Registers a new user.
    ///
    /// Email and username are lowercased before any lookup or write. The
    /// email check runs strictly before the username check, and both before
    /// any mutation.
    pub async fn register(
        &self,
        request: RegisterUserRequest,
    ) -> Result<User, UsuarioServiceError> {
        let email = request.email.to_lowercase();
        let username = request.username.to_lowercase();

        if self.usuarios.find_by_email(&email).await?.is_some() {
            return Err(UsuarioServiceError::EmailTaken);
        }
        if self.usuarios.find_by_username(&username).await?.is_some() {
            return Err(UsuarioServiceError::UsernameTaken);
        }

        let modalidade_ids = self
            .resolve_modalidade_ids(&request.modalidades_nomes)
            .await?;

        let password_hash = hash_password(&request.password)?;

        let entity = self
            .usuarios
            .create(
                NewUsuario {
                    name: &request.name,
                    genero: request.genero.as_str(),
                    username: &username,
                    email: &email,
                    data_nascimento: request.data_nascimento,
                    password_hash: &password_hash,
                    phone: &request.phone,
                    cep: &normalize_cep(&request.cep),
                    uf: &normalize_uf(&request.uf),
                    street: &request.street,
                },
                &modalidade_ids,
            )
            .await?;

        info!(user_id = %entity.id, username = %entity.user_name, "user registered");
        self.to_domain(entity).await
    }

    /// Checks a login (username or email) against the stored password hash.
    ///
    /// Every failure collapses into `InvalidCredentials` so the response
    /// never reveals which part was wrong.
    pub async fn authenticate(
        &self,
        login: &str,
        password: &str,
    ) -> Result<Credential, UsuarioServiceError> {
        let entity = match self.usuarios.find_by_username(login).await? {
            Some(entity) => Some(entity),
            None => self.usuarios.find_by_email(login).await?,
        };
        let entity = entity.ok_or(UsuarioServiceError::InvalidCredentials)?;

        let valid = verify_password(password, &entity.password)?;
        if !valid {
            return Err(UsuarioServiceError::InvalidCredentials);
        }

        Ok(Credential {
            id: entity.id,
            email: entity.email,
            username: entity.user_name,
            password_hash: entity.password,
            authorities: Vec::new(),
        })
    }

    /// Public profile lookup by username.
    pub async fn find_by_username(
        &self,
        username: &str,
    ) -> Result<UserResponse, UsuarioServiceError> {
        let entity = self.usuarios.find_by_username(username).await?.ok_or_else(|| {
            UsuarioServiceError::NotFound(format!(
                "Usuário não encontrado com username: {username}"
            ))
        })?;

        Ok(self.to_domain(entity).await?.into())
    }

    /// The authenticated principal's own profile.
    pub async fn me(&self, email: &str) -> Result<UserResponse, UsuarioServiceError> {
        let entity = self
            .usuarios
            .find_by_email(email)
            .await?
            .ok_or_else(|| UsuarioServiceError::NotFound("Usuário não encontrado".into()))?;

        Ok(self.to_domain(entity).await?.into())
    }

    /// Page of all users in registration order.
    pub async fn find_all_paginated(
        &self,
        request: PageRequest,
    ) -> Result<Page<UserResponse>, UsuarioServiceError> {
        let entities = self
            .usuarios
            .find_all_paginated(request.limit(), request.offset())
            .await?;
        let total = self.usuarios.count_all().await?;

        let mut content = Vec::with_capacity(entities.len());
        for entity in entities {
            content.push(self.to_domain(entity).await?.into());
        }

        Ok(Page::new(content, request, total))
    }

    /// Applies a partial profile update for the authenticated user.
    ///
    /// Absent fields stay untouched. A present, non-blank password is
    /// re-hashed. A present modalidade list (even empty) replaces the stored
    /// set after the same strict existence check as registration.
    pub async fn update(
        &self,
        email: &str,
        request: UpdateUserRequest,
    ) -> Result<User, UsuarioServiceError> {
        let entity = self
            .usuarios
            .find_by_email(email)
            .await?
            .ok_or_else(|| UsuarioServiceError::NotFound("Usuário não encontrado".into()))?;

        let mut user = self.to_domain(entity).await?;
        request.merge_into(&mut user);

        if request.has_new_password() {
            let password = request.password.as_deref().unwrap_or_default();
            user.password_hash = hash_password(password)?;
        }

        self.usuarios.update(&entity_from_domain(&user)).await?;

        if let Some(nomes) = &request.modalidades_nomes {
            let modalidade_ids = self.resolve_modalidade_ids(nomes).await?;
            self.usuarios
                .set_modalidades(user.id, &modalidade_ids)
                .await?;
            user.modalidades = self.usuarios.modalidades_nomes(user.id).await?;
        }

        Ok(user)
    }

    /// Deletes the authenticated user's account.
    ///
    /// Activities created by the user go first so no dangling creator
    /// references survive; participation and preference links follow via FK
    /// cascade.
    pub async fn delete_self(&self, email: &str) -> Result<(), UsuarioServiceError> {
        let entity = self
            .usuarios
            .find_by_email(email)
            .await?
            .ok_or_else(|| UsuarioServiceError::NotFound("Usuário não encontrado".into()))?;

        let removed = self.atividades.delete_by_criador(entity.id).await?;
        self.usuarios.delete(entity.id).await?;

        info!(user_id = %entity.id, atividades_removidas = removed, "user deleted own account");
        Ok(())
    }

    /// Uppercases the requested names and resolves them against the
    /// reference table; any unknown name fails the whole request.
    async fn resolve_modalidade_ids(
        &self,
        nomes: &[String],
    ) -> Result<Vec<i64>, UsuarioServiceError> {
        if nomes.is_empty() {
            return Ok(Vec::new());
        }

        let upper: Vec<String> = nomes.iter().map(|n| n.to_uppercase()).collect();
        let found = self.modalidades.find_by_nomes(&upper).await?;

        if found.len() != upper.len() {
            return Err(UsuarioServiceError::ModalidadeInvalida);
        }

        Ok(found.into_iter().map(|m| m.id).collect())
    }

    async fn to_domain(&self, entity: UsuarioEntity) -> Result<User, UsuarioServiceError> {
        let modalidades = self.usuarios.modalidades_nomes(entity.id).await?;
        let genero = Genero::from_str(&entity.genero).ok_or_else(|| {
            UsuarioServiceError::Internal(format!("unknown genero stored: {}", entity.genero))
        })?;

        Ok(User {
            id: entity.id,
            name: entity.name,
            genero,
            username: entity.user_name,
            email: entity.email,
            data_nascimento: entity.data_nascimento,
            password_hash: entity.password,
            phone: entity.phone,
            cep: entity.cep,
            uf: entity.uf,
            street: entity.street,
            modalidades,
            data_cadastro: entity.data_cadastro,
        })
    }
}

fn entity_from_domain(user: &User) -> UsuarioEntity {
    UsuarioEntity {
        id: user.id,
        name: user.name.clone(),
        genero: user.genero.as_str().to_string(),
        user_name: user.username.clone(),
        email: user.email.clone(),
        data_nascimento: user.data_nascimento,
        password: user.password_hash.clone(),
        phone: user.phone.clone(),
        cep: user.cep.clone(),
        uf: user.uf.clone(),
        street: user.street.clone(),
        data_cadastro: user.data_cadastro,
    }
}
