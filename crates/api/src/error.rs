use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

/// API error taxonomy. Every variant maps to a structured `{code, message}`
/// JSON body; internals are logged, never returned.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Conflict: {message}")]
    Conflict {
        code: &'static str,
        message: String,
    },

    #[error("Bad request: {message}")]
    BadRequest {
        code: &'static str,
        message: String,
    },

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid state: {0}")]
    InvalidState(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    code: String,
    message: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code, message) = match self {
            ApiError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, "unauthorized", msg),
            ApiError::Forbidden(msg) => (StatusCode::FORBIDDEN, "forbidden", msg),
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, "not_found", msg),
            ApiError::Conflict { code, message } => (StatusCode::CONFLICT, code, message),
            ApiError::BadRequest { code, message } => (StatusCode::BAD_REQUEST, code, message),
            ApiError::Validation(msg) => (StatusCode::BAD_REQUEST, "validation_error", msg),
            ApiError::InvalidState(msg) => (StatusCode::BAD_REQUEST, "invalid_state", msg),
            ApiError::Internal(msg) => {
                tracing::error!("Internal error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal_error",
                    "Ocorreu um erro inesperado no servidor".to_string(),
                )
            }
        };

        let body = ErrorBody {
            code: code.into(),
            message,
        };

        (status, Json(body)).into_response()
    }
}

impl From<sqlx::Error> for ApiError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => ApiError::NotFound("Recurso não encontrado".into()),
            sqlx::Error::Database(db_err) => {
                if let Some(code) = db_err.code() {
                    match code.as_ref() {
                        "23505" => ApiError::Conflict {
                            code: "conflict",
                            message: "Recurso já existe".into(),
                        },
                        "23503" => ApiError::NotFound("Recurso referenciado não existe".into()),
                        _ => ApiError::Internal(format!("Database error: {}", db_err)),
                    }
                } else {
                    ApiError::Internal(format!("Database error: {}", db_err))
                }
            }
            _ => ApiError::Internal(format!("Database error: {}", err)),
        }
    }
}

impl From<validator::ValidationErrors> for ApiError {
    fn from(errors: validator::ValidationErrors) -> Self {
        // Fail fast: surface only the first failing field's message.
        let first = errors
            .field_errors()
            .iter()
            .flat_map(|(field, errs)| {
                errs.iter().map(move |e| {
                    e.message
                        .clone()
                        .map(|m| m.to_string())
                        .unwrap_or_else(|| format!("campo inválido: {}", field))
                })
            })
            .next()
            .unwrap_or_else(|| "payload inválido".to_string());

        ApiError::Validation(first)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;
    use validator::Validate;

    #[test]
    fn test_status_mapping() {
        let cases: Vec<(ApiError, StatusCode)> = vec![
            (
                ApiError::Unauthorized("x".into()),
                StatusCode::UNAUTHORIZED,
            ),
            (ApiError::Forbidden("x".into()), StatusCode::FORBIDDEN),
            (ApiError::NotFound("x".into()), StatusCode::NOT_FOUND),
            (
                ApiError::Conflict {
                    code: "EMAIL_TAKEN",
                    message: "x".into(),
                },
                StatusCode::CONFLICT,
            ),
            (
                ApiError::BadRequest {
                    code: "MODALIDADE_INVALIDA",
                    message: "x".into(),
                },
                StatusCode::BAD_REQUEST,
            ),
            (ApiError::Validation("x".into()), StatusCode::BAD_REQUEST),
            (ApiError::InvalidState("x".into()), StatusCode::BAD_REQUEST),
            (
                ApiError::Internal("boom".into()),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];

        for (error, status) in cases {
            assert_eq!(error.into_response().status(), status);
        }
    }

    #[test]
    fn test_internal_error_hides_details() {
        let error = ApiError::Internal("connection refused at 10.0.0.5".into());
        let response = error.into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        // Body is built from a fixed message; the detail only goes to logs.
    }

    #[test]
    fn test_from_sqlx_row_not_found() {
        let error: ApiError = sqlx::Error::RowNotFound.into();
        assert!(matches!(error, ApiError::NotFound(_)));
    }

    #[test]
    fn test_validation_errors_take_first_message() {
        #[derive(Validate)]
        struct Payload {
            #[validate(length(min = 8, message = "A senha precisa ter no minimo 8 caracteres"))]
            password: String,
        }

        let payload = Payload {
            password: "curta".into(),
        };
        let error: ApiError = payload.validate().unwrap_err().into();

        match error {
            ApiError::Validation(msg) => {
                assert_eq!(msg, "A senha precisa ter no minimo 8 caracteres")
            }
            other => panic!("expected Validation, got {:?}", other),
        }
    }

    #[test]
    fn test_error_display() {
        assert_eq!(
            format!("{}", ApiError::Forbidden("sem permissão".into())),
            "Forbidden: sem permissão"
        );
        assert_eq!(
            format!(
                "{}",
                ApiError::Conflict {
                    code: "EMAIL_TAKEN",
                    message: "email em uso".into()
                }
            ),
            "Conflict: email em uso"
        );
    }
}
