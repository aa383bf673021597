//! Authenticated-principal extractor.
//!
//! Validates the Bearer token from the Authorization header and exposes the
//! token subject (the user's email). Verification failures degrade to
//! "unauthenticated" — they never become server errors.

use axum::{async_trait, extract::FromRequestParts, http::request::Parts};

use crate::app::AppState;
use crate::error::ApiError;

/// The authenticated principal of the current request.
///
/// Handlers taking this parameter reject unauthenticated requests with 401;
/// the identity is then threaded explicitly into every service call.
#[derive(Debug, Clone)]
pub struct AuthUser {
    /// Token subject: the user's email, lowercase.
    pub email: String,
}

fn bearer_token(parts: &Parts) -> Option<&str> {
    parts
        .headers
        .get("Authorization")
        .and_then(|v| v.to_str().ok())
        .and_then(|header| header.strip_prefix("Bearer "))
        .filter(|token| !token.is_empty())
}

#[async_trait]
impl FromRequestParts<AppState> for AuthUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = bearer_token(parts).ok_or_else(|| {
            ApiError::Unauthorized("Missing or invalid Authorization header".to_string())
        })?;

        match state.jwt.verify(token) {
            Some(email) => Ok(AuthUser {
                email: email.to_lowercase(),
            }),
            None => {
                tracing::debug!("JWT rejected (invalid or expired)");
                Err(ApiError::Unauthorized(
                    "Invalid or expired token".to_string(),
                ))
            }
        }
    }
}

/// Optional authentication.
///
/// Routes taking this extractor proceed unauthenticated when the token is
/// absent or invalid; downstream authorization decides what to deny.
#[derive(Debug, Clone)]
pub struct OptionalAuthUser(pub Option<AuthUser>);

#[async_trait]
impl FromRequestParts<AppState> for OptionalAuthUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let auth = bearer_token(parts)
            .and_then(|token| state.jwt.verify(token))
            .map(|email| AuthUser {
                email: email.to_lowercase(),
            });

        Ok(OptionalAuthUser(auth))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::Request;

    fn parts_with_header(value: Option<&str>) -> Parts {
        let mut builder = Request::builder().uri("/atividades");
        if let Some(v) = value {
            builder = builder.header("Authorization", v);
        }
        let (parts, _) = builder.body(()).unwrap().into_parts();
        parts
    }

    #[test]
    fn test_bearer_token_present() {
        let parts = parts_with_header(Some("Bearer abc.def.ghi"));
        assert_eq!(bearer_token(&parts), Some("abc.def.ghi"));
    }

    #[test]
    fn test_bearer_token_missing_header() {
        let parts = parts_with_header(None);
        assert_eq!(bearer_token(&parts), None);
    }

    #[test]
    fn test_bearer_token_wrong_scheme() {
        let parts = parts_with_header(Some("Basic dXNlcjpwYXNz"));
        assert_eq!(bearer_token(&parts), None);
    }

    #[test]
    fn test_bearer_token_empty() {
        let parts = parts_with_header(Some("Bearer "));
        assert_eq!(bearer_token(&parts), None);
    }
}
