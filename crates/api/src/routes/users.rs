//! User registration and profile routes.

use axum::{
    extract::{Path, Query, State},
    http::{header, StatusCode},
    response::IntoResponse,
    Json,
};
use validator::Validate;

use domain::models::{RegisterUserRequest, UpdateUserRequest, UserResponse};
use shared::pagination::{Page, PageRequest};

use crate::app::AppState;
use crate::error::ApiError;
use crate::extractors::AuthUser;
use crate::services::UsuarioService;

/// POST /users/register (public)
///
/// 201 with a Location header on success; 409 EMAIL_TAKEN / USERNAME_TAKEN
/// on uniqueness conflicts; 400 MODALIDADE_INVALIDA on unknown modalidades.
pub async fn register(
    State(state): State<AppState>,
    Json(request): Json<RegisterUserRequest>,
) -> Result<impl IntoResponse, ApiError> {
    request.validate().map_err(ApiError::from)?;

    let service = UsuarioService::new(state.pool.clone());
    let user = service.register(request).await.map_err(ApiError::from)?;

    let location = format!("/users/{}", user.id);
    Ok((
        StatusCode::CREATED,
        [(header::LOCATION, location)],
        Json(UserResponse::from(user)),
    ))
}

/// GET /users?page=&size=
pub async fn find_all(
    State(state): State<AppState>,
    _auth: AuthUser,
    Query(page): Query<PageRequest>,
) -> Result<Json<Page<UserResponse>>, ApiError> {
    let service = UsuarioService::new(state.pool.clone());
    let users = service
        .find_all_paginated(page)
        .await
        .map_err(ApiError::from)?;
    Ok(Json(users))
}

/// GET /users/{username}
pub async fn find_by_username(
    State(state): State<AppState>,
    _auth: AuthUser,
    Path(username): Path<String>,
) -> Result<Json<UserResponse>, ApiError> {
    let service = UsuarioService::new(state.pool.clone());
    let user = service
        .find_by_username(&username)
        .await
        .map_err(ApiError::from)?;
    Ok(Json(user))
}

/// PUT /users
///
/// Partial update of the authenticated user's own profile.
pub async fn update_me(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(request): Json<UpdateUserRequest>,
) -> Result<Json<UserResponse>, ApiError> {
    request.validate().map_err(ApiError::from)?;

    let service = UsuarioService::new(state.pool.clone());
    let user = service
        .update(&auth.email, request)
        .await
        .map_err(ApiError::from)?;
    Ok(Json(user.into()))
}

/// DELETE /users/me
///
/// Deletes the authenticated user's account, removing owned activities
/// first.
pub async fn delete_me(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<StatusCode, ApiError> {
    let service = UsuarioService::new(state.pool.clone());
    service
        .delete_self(&auth.email)
        .await
        .map_err(ApiError::from)?;
    Ok(StatusCode::NO_CONTENT)
}
