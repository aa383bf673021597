//! Modalidade listing route.

use axum::{extract::State, Json};

use domain::models::{Modalidade, ModalidadeResponse};
use persistence::repositories::ModalidadeRepository;

use crate::app::AppState;
use crate::error::ApiError;
use crate::extractors::AuthUser;

/// GET /modalidades
///
/// All sport categories, alphabetically.
pub async fn find_all(
    State(state): State<AppState>,
    _auth: AuthUser,
) -> Result<Json<Vec<ModalidadeResponse>>, ApiError> {
    let repository = ModalidadeRepository::new(state.pool.clone());
    let modalidades = repository.find_all().await.map_err(ApiError::from)?;

    let response = modalidades
        .into_iter()
        .map(|entity| {
            ModalidadeResponse::from(Modalidade {
                id: entity.id,
                nome: entity.nome,
            })
        })
        .collect();

    Ok(Json(response))
}
