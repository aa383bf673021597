//! Login and current-principal routes.

use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};
use validator::Validate;

use domain::models::UserResponse;

use crate::app::AppState;
use crate::error::ApiError;
use crate::extractors::AuthUser;
use crate::services::UsuarioService;

/// Login payload. `username` also accepts the account's email.
#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(length(min = 1, message = "campo Obrigatorio"))]
    pub username: String,

    #[validate(length(min = 1, message = "campo Obrigatorio"))]
    pub password: String,
}

/// Successful login response.
#[derive(Debug, Serialize)]
pub struct TokenResponse {
    pub token: String,
}

/// POST /login
///
/// Verifies the credentials and issues a signed token with the user's email
/// as subject.
pub async fn login(
    State(state): State<AppState>,
    Json(request): Json<LoginRequest>,
) -> Result<Json<TokenResponse>, ApiError> {
    request.validate().map_err(ApiError::from)?;

    let service = UsuarioService::new(state.pool.clone());
    let credential = service
        .authenticate(&request.username, &request.password)
        .await
        .map_err(ApiError::from)?;

    let token = state
        .jwt
        .issue(&credential.email)
        .map_err(|e| ApiError::Internal(e.to_string()))?;

    Ok(Json(TokenResponse { token }))
}

/// GET /me
///
/// Profile of the authenticated principal.
pub async fn me(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<Json<UserResponse>, ApiError> {
    let service = UsuarioService::new(state.pool.clone());
    let user = service.me(&auth.email).await.map_err(ApiError::from)?;
    Ok(Json(user))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_login_request_requires_both_fields() {
        let empty = LoginRequest {
            username: "".into(),
            password: "".into(),
        };
        assert!(empty.validate().is_err());

        let ok = LoginRequest {
            username: "anasouza".into(),
            password: "senha-forte".into(),
        };
        assert!(ok.validate().is_ok());
    }

    #[test]
    fn test_token_response_shape() {
        let response = TokenResponse {
            token: "abc.def.ghi".into(),
        };
        let json = serde_json::to_string(&response).unwrap();
        assert_eq!(json, r#"{"token":"abc.def.ghi"}"#);
    }
}
