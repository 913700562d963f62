use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use thiserror::Error;
use tracing::error;

use crate::server::constants::INTERNAL_ERROR;

#[derive(Debug, Error)]
pub enum RequestError {
    #[error("{0}")]
    NotFound(String),
    #[error("{0}")]
    Conflict(String),
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error("sqlx error: {0}")]
    Sqlx(#[from] sqlx::Error),
}

#[derive(Clone, Debug, Error)]
pub enum ValidationError {
    #[error("El campo `{field}` es obligatorio y no puede estar vacío")]
    EmptyField { field: &'static str },
    #[error("Valor inválido: `{value}`, motivo: {reason}")]
    InvalidInput { value: String, reason: String },
    #[error("Límite excedido para {subject}: permitido {limit}, recibido {attempted}")]
    LimitExceeded {
        subject: String,
        attempted: usize,
        limit: usize,
    },
}

impl IntoResponse for RequestError {
    fn into_response(self) -> Response {
        let (status, error) = match self {
            Self::Sqlx(e) => match e {
                sqlx::Error::RowNotFound => (StatusCode::NOT_FOUND, "no encontrado".to_string()),
                e => {
                    error!("received internal error for user request: {e}");
                    (StatusCode::INTERNAL_SERVER_ERROR, INTERNAL_ERROR.to_string())
                }
            },
            Self::Validation(e) => (StatusCode::BAD_REQUEST, e.to_string()),
            Self::NotFound(message) => (StatusCode::NOT_FOUND, message),
            Self::Conflict(message) => (StatusCode::BAD_REQUEST, message),
        };
        (status, Json(json!({ "error": error }))).into_response()
    }
}

/// True when the error is a unique-constraint violation, the signal that a
/// `title` or tag `name` already exists.
pub fn is_unique_violation(error: &sqlx::Error) -> bool {
    error
        .as_database_error()
        .is_some_and(|e| e.is_unique_violation())
}
