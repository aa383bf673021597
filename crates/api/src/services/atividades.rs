//! Activity lifecycle and subscription engine.

use sqlx::PgPool;
use tracing::info;
use uuid::Uuid;

use domain::models::{
    Atividade, CreateAtividadeRequest, StatusAtividade, UpdateAtividadeRequest,
};
use domain::services::{avaliar_inscricao, InscricaoError};
use persistence::entities::{AtividadeDetalheRow, AtividadeEntity, UsuarioEntity};
use persistence::repositories::{
    AtividadeRepository, ModalidadeRepository, NewAtividade, UsuarioRepository,
};
use shared::pagination::{Page, PageRequest};
use shared::validation::{normalize_cep, normalize_uf};
use thiserror::Error;

use crate::error::ApiError;
use crate::services::geocoding::GeocodingClient;

/// Errors produced by activity operations.
#[derive(Debug, Error)]
pub enum AtividadeServiceError {
    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    AccessDenied(String),

    #[error("Não foi possível obter as coordenadas para o CEP informado. A atividade não pode ser criada")]
    CoordenadasIndisponiveis,

    #[error("CEP inválido ou não foi possível encontrar coordenadas: {0}")]
    CepNaoEncontrado(String),

    #[error("Modalidade informada não existe")]
    ModalidadeInvalida,

    #[error("capacidade deve ser positiva quando a atividade tem limite")]
    CapacidadeInvalida,

    #[error(transparent)]
    Inscricao(#[from] InscricaoError),

    #[error("Uma atividade fechada ou cancelada não pode ser reaberta")]
    ReaberturaInvalida,

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<AtividadeServiceError> for ApiError {
    fn from(err: AtividadeServiceError) -> Self {
        match err {
            AtividadeServiceError::NotFound(msg) => ApiError::NotFound(msg),
            AtividadeServiceError::AccessDenied(msg) => ApiError::Forbidden(msg),
            AtividadeServiceError::CoordenadasIndisponiveis => {
                ApiError::Validation(AtividadeServiceError::CoordenadasIndisponiveis.to_string())
            }
            AtividadeServiceError::CepNaoEncontrado(cep) => {
                ApiError::NotFound(AtividadeServiceError::CepNaoEncontrado(cep).to_string())
            }
            AtividadeServiceError::ModalidadeInvalida => ApiError::BadRequest {
                code: "MODALIDADE_INVALIDA",
                message: AtividadeServiceError::ModalidadeInvalida.to_string(),
            },
            AtividadeServiceError::CapacidadeInvalida => {
                ApiError::Validation(AtividadeServiceError::CapacidadeInvalida.to_string())
            }
            AtividadeServiceError::Inscricao(e) => ApiError::InvalidState(e.to_string()),
            AtividadeServiceError::ReaberturaInvalida => {
                ApiError::InvalidState(AtividadeServiceError::ReaberturaInvalida.to_string())
            }
            AtividadeServiceError::Database(e) => e.into(),
            AtividadeServiceError::Internal(msg) => ApiError::Internal(msg),
        }
    }
}

/// Activity engine orchestrating repositories and the geocoding client.
#[derive(Clone)]
pub struct AtividadeService {
    atividades: AtividadeRepository,
    usuarios: UsuarioRepository,
    modalidades: ModalidadeRepository,
    geocoding: GeocodingClient,
}

impl AtividadeService {
    pub fn new(pool: PgPool, geocoding: GeocodingClient) -> Self {
        Self {
            atividades: AtividadeRepository::new(pool.clone()),
            usuarios: UsuarioRepository::new(pool.clone()),
            modalidades: ModalidadeRepository::new(pool),
            geocoding,
        }
    }

    /// Creates an activity for the authenticated creator.
    ///
    /// Status is forced to OPEN and the creator joins as first participant.
    /// The CEP is resolved to coordinates before anything is persisted; if
    /// both providers fail, creation fails and nothing is written.
    pub async fn create(
        &self,
        request: CreateAtividadeRequest,
        criador_email: &str,
    ) -> Result<Atividade, AtividadeServiceError> {
        if !request.capacidade_valida() {
            return Err(AtividadeServiceError::CapacidadeInvalida);
        }

        let criador = self.load_usuario(criador_email).await?;

        let modalidade = self
            .modalidades
            .find_by_nome(&request.modalidade.to_uppercase())
            .await?
            .ok_or(AtividadeServiceError::ModalidadeInvalida)?;

        let coords = self
            .geocoding
            .get_coordinates(&request.cep)
            .await
            .ok_or(AtividadeServiceError::CoordenadasIndisponiveis)?;

        let entity = self
            .atividades
            .create(NewAtividade {
                criador_id: criador.id,
                modalidade_id: modalidade.id,
                titulo: &request.titulo,
                observacoes: request.observacoes.as_deref(),
                data: request.data,
                horario: request.horario,
                cep: &normalize_cep(&request.cep),
                uf: &normalize_uf(&request.uf),
                street: &request.street,
                latitude: coords.latitude,
                longitude: coords.longitude,
                capacidade: request.capacidade,
                sem_limite: request.sem_limite,
                status: StatusAtividade::Open.as_str(),
            })
            .await?;

        info!(atividade_id = %entity.id, criador_id = %criador.id, "activity created");
        self.load_detalhe(entity.id).await
    }

    /// Applies a creator-only partial update.
    ///
    /// Merge semantics: absent fields stay untouched. Status may move to
    /// CLOSED or CANCELED but never back to OPEN. Coordinates are never
    /// re-resolved.
    pub async fn update(
        &self,
        atividade_id: Uuid,
        request: UpdateAtividadeRequest,
        acting_email: &str,
    ) -> Result<Atividade, AtividadeServiceError> {
        let mut atividade = self.load_detalhe(atividade_id).await?;
        let acting = self.load_usuario(acting_email).await?;

        if atividade.criador_id != acting.id {
            return Err(AtividadeServiceError::AccessDenied(
                "Acesso negado: você não tem permissão para alterar esta atividade".into(),
            ));
        }

        request.merge_into(&mut atividade);

        if let Some(novo_status) = request.status {
            if novo_status == StatusAtividade::Open && atividade.status != StatusAtividade::Open {
                return Err(AtividadeServiceError::ReaberturaInvalida);
            }
            atividade.status = novo_status;
        }

        self.atividades.update(&entity_from_domain(&atividade)).await?;
        self.load_detalhe(atividade_id).await
    }

    /// Subscribes the authenticated user to an activity.
    ///
    /// Runs inside a transaction holding a `FOR UPDATE` lock on the activity
    /// row, so two concurrent subscribers cannot both pass the capacity
    /// check. Filling the last slot moves the activity to CLOSED — the only
    /// code path that produces that transition.
    pub async fn inscrever(
        &self,
        atividade_id: Uuid,
        acting_email: &str,
    ) -> Result<(), AtividadeServiceError> {
        let acting = self.load_usuario(acting_email).await?;

        let mut tx = self.atividades.pool().begin().await?;

        let atividade = self
            .atividades
            .find_for_update(&mut tx, atividade_id)
            .await?
            .ok_or_else(|| {
                AtividadeServiceError::NotFound(format!(
                    "Atividade não encontrada com o ID: {atividade_id}"
                ))
            })?;

        let status = parse_status(&atividade.status)?;
        let ja_inscrito = self
            .atividades
            .is_participante(&mut tx, atividade_id, acting.id)
            .await?;
        let participantes = self
            .atividades
            .count_participantes(&mut tx, atividade_id)
            .await?;

        let decision = avaliar_inscricao(
            status,
            ja_inscrito,
            atividade.sem_limite,
            atividade.capacidade,
            participantes,
        )?;

        self.atividades
            .add_participante(&mut tx, atividade_id, acting.id)
            .await?;

        if decision.fechar {
            self.atividades
                .set_status(&mut tx, atividade_id, StatusAtividade::Closed.as_str())
                .await?;
        }

        tx.commit().await?;

        info!(
            atividade_id = %atividade_id,
            usuario_id = %acting.id,
            fechou = decision.fechar,
            "user subscribed to activity"
        );
        Ok(())
    }

    /// Page of activities within `raio_km` of the CEP, closest first.
    ///
    /// The page and its total come from the same SQL predicate.
    pub async fn find_nearby_paginated(
        &self,
        cep: &str,
        raio_km: f64,
        request: PageRequest,
    ) -> Result<Page<Atividade>, AtividadeServiceError> {
        let coords = self
            .geocoding
            .get_coordinates(cep)
            .await
            .ok_or_else(|| AtividadeServiceError::CepNaoEncontrado(cep.to_string()))?;

        let rows = self
            .atividades
            .find_nearby_paginated(
                coords.latitude,
                coords.longitude,
                raio_km,
                request.limit(),
                request.offset(),
            )
            .await?;
        let total = self
            .atividades
            .count_nearby(coords.latitude, coords.longitude, raio_km)
            .await?;

        let content = rows
            .into_iter()
            .map(row_to_domain)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Page::new(content, request, total))
    }

    /// Default-ordered page of all activities.
    pub async fn find_all_paginated(
        &self,
        request: PageRequest,
    ) -> Result<Page<Atividade>, AtividadeServiceError> {
        let rows = self
            .atividades
            .find_all_paginated(request.limit(), request.offset())
            .await?;
        let total = self.atividades.count_all().await?;

        let content = rows
            .into_iter()
            .map(row_to_domain)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Page::new(content, request, total))
    }

    /// Detail lookup by id.
    pub async fn find_by_id(
        &self,
        atividade_id: Uuid,
    ) -> Result<Atividade, AtividadeServiceError> {
        self.load_detalhe(atividade_id).await
    }

    /// Creator-only deletion. Participant rows go with the activity via FK
    /// cascade.
    pub async fn delete_by_id(
        &self,
        atividade_id: Uuid,
        acting_email: &str,
    ) -> Result<(), AtividadeServiceError> {
        let atividade = self
            .atividades
            .find_by_id(atividade_id)
            .await?
            .ok_or_else(|| {
                AtividadeServiceError::NotFound(format!(
                    "Atividade não encontrada com o ID: {atividade_id}"
                ))
            })?;

        let acting = self.load_usuario(acting_email).await?;
        if atividade.criador_id != acting.id {
            return Err(AtividadeServiceError::AccessDenied(
                "Acesso negado: você não tem permissão para excluir esta atividade".into(),
            ));
        }

        self.atividades.delete(atividade_id).await?;
        info!(atividade_id = %atividade_id, "activity deleted");
        Ok(())
    }

    async fn load_usuario(&self, email: &str) -> Result<UsuarioEntity, AtividadeServiceError> {
        self.usuarios
            .find_by_email(email)
            .await?
            .ok_or_else(|| AtividadeServiceError::NotFound("Usuário não encontrado".into()))
    }

    async fn load_detalhe(&self, id: Uuid) -> Result<Atividade, AtividadeServiceError> {
        let row = self.atividades.find_detalhe_by_id(id).await?.ok_or_else(|| {
            AtividadeServiceError::NotFound(format!("Atividade não encontrada com o ID: {id}"))
        })?;
        row_to_domain(row)
    }
}

fn parse_status(raw: &str) -> Result<StatusAtividade, AtividadeServiceError> {
    StatusAtividade::from_str(raw)
        .ok_or_else(|| AtividadeServiceError::Internal(format!("unknown status stored: {raw}")))
}

fn row_to_domain(row: AtividadeDetalheRow) -> Result<Atividade, AtividadeServiceError> {
    let status = parse_status(&row.status)?;
    Ok(Atividade {
        id: row.id,
        criador_id: row.criador_id,
        criador_nome: row.criador_nome,
        modalidade_id: row.modalidade_id,
        modalidade_nome: row.modalidade_nome,
        titulo: row.titulo,
        observacoes: row.observacoes,
        data: row.data,
        horario: row.horario,
        cep: row.cep,
        uf: row.uf,
        street: row.street,
        latitude: row.latitude,
        longitude: row.longitude,
        capacidade: row.capacidade,
        sem_limite: row.sem_limite,
        status,
        participantes_count: row.participantes_count,
        criado_em: row.criado_em,
        atualizado_em: row.atualizado_em,
    })
}

fn entity_from_domain(atividade: &Atividade) -> AtividadeEntity {
    AtividadeEntity {
        id: atividade.id,
        criador_id: atividade.criador_id,
        modalidade_id: atividade.modalidade_id,
        titulo: atividade.titulo.clone(),
        observacoes: atividade.observacoes.clone(),
        data: atividade.data,
        horario: atividade.horario,
        cep: atividade.cep.clone(),
        uf: atividade.uf.clone(),
        street: atividade.street.clone(),
        latitude: atividade.latitude,
        longitude: atividade.longitude,
        capacidade: atividade.capacidade,
        sem_limite: atividade.sem_limite,
        status: atividade.status.as_str().to_string(),
        criado_em: atividade.criado_em,
        atualizado_em: atividade.atualizado_em,
    }
}
