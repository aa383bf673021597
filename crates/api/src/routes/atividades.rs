//! Activity routes: creation, listing, proximity search, update,
//! subscription and deletion.

use axum::{
    extract::{Path, Query, State},
    http::{header, StatusCode},
    response::IntoResponse,
    Json,
};
use serde::Deserialize;
use uuid::Uuid;
use validator::Validate;

use domain::models::{AtividadeResponse, CreateAtividadeRequest, UpdateAtividadeRequest};
use shared::pagination::{Page, PageRequest};

use crate::app::AppState;
use crate::error::ApiError;
use crate::extractors::AuthUser;
use crate::services::AtividadeService;

fn service(state: &AppState) -> AtividadeService {
    AtividadeService::new(state.pool.clone(), state.geocoding.clone())
}

/// POST /atividades
///
/// Creates an activity; the authenticated caller becomes creator and first
/// participant. 201 with a Location header.
pub async fn create(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(request): Json<CreateAtividadeRequest>,
) -> Result<impl IntoResponse, ApiError> {
    request.validate().map_err(ApiError::from)?;

    let atividade = service(&state)
        .create(request, &auth.email)
        .await
        .map_err(ApiError::from)?;

    let location = format!("/atividades/{}", atividade.id);
    Ok((
        StatusCode::CREATED,
        [(header::LOCATION, location)],
        Json(AtividadeResponse::from(atividade)),
    ))
}

/// GET /atividades?page=&size=
pub async fn find_all(
    State(state): State<AppState>,
    _auth: AuthUser,
    Query(page): Query<PageRequest>,
) -> Result<Json<Page<AtividadeResponse>>, ApiError> {
    let atividades = service(&state)
        .find_all_paginated(page)
        .await
        .map_err(ApiError::from)?;
    Ok(Json(atividades.map(AtividadeResponse::from)))
}

/// Query parameters for the proximity search.
#[derive(Debug, Deserialize)]
pub struct ProximasParams {
    pub cep: String,
    #[serde(default = "default_distancia")]
    pub distancia: f64,
}

fn default_distancia() -> f64 {
    10.0
}

/// GET /atividades/proximas?cep=&distancia=&page=&size=
///
/// Activities within `distancia` km of the CEP, closest first. 404 when the
/// CEP cannot be resolved.
pub async fn find_nearby(
    State(state): State<AppState>,
    _auth: AuthUser,
    Query(params): Query<ProximasParams>,
    Query(page): Query<PageRequest>,
) -> Result<Json<Page<AtividadeResponse>>, ApiError> {
    let atividades = service(&state)
        .find_nearby_paginated(&params.cep, params.distancia, page)
        .await
        .map_err(ApiError::from)?;
    Ok(Json(atividades.map(AtividadeResponse::from)))
}

/// GET /atividades/{id}
pub async fn find_by_id(
    State(state): State<AppState>,
    _auth: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<AtividadeResponse>, ApiError> {
    let atividade = service(&state)
        .find_by_id(id)
        .await
        .map_err(ApiError::from)?;
    Ok(Json(atividade.into()))
}

/// PUT /atividades/{id} (creator-only)
///
/// Partial update; 204 on success.
pub async fn update(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
    Json(request): Json<UpdateAtividadeRequest>,
) -> Result<StatusCode, ApiError> {
    request.validate().map_err(ApiError::from)?;

    service(&state)
        .update(id, request, &auth.email)
        .await
        .map_err(ApiError::from)?;
    Ok(StatusCode::NO_CONTENT)
}

/// POST /atividades/{id}/inscrever
///
/// Subscribes the authenticated user; 204 on success, 400 on any
/// business-rule violation.
pub async fn inscrever(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    service(&state)
        .inscrever(id, &auth.email)
        .await
        .map_err(ApiError::from)?;
    Ok(StatusCode::NO_CONTENT)
}

/// DELETE /atividades/{id} (creator-only)
pub async fn delete(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    service(&state)
        .delete_by_id(id, &auth.email)
        .await
        .map_err(ApiError::from)?;
    Ok(StatusCode::NO_CONTENT)
}
