use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use services::services::{
    dashboard::DashboardError, export::ExportError, repository::RepositoryError,
};
use thiserror::Error;
use tracing::error;
use utils::response::ApiResponse;

/// API error taxonomy. Every failure is converted into a user-visible
/// message; nothing escapes to a global handler.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Inline validation failure (bad identifier, required field empty).
    #[error("{0}")]
    Validation(String),
    /// The identifier is already registered; the save is rejected.
    #[error("{0}")]
    Duplicate(String),
    /// A scoped resource does not exist.
    #[error("recurso no encontrado")]
    NotFound,
    #[error("error de base de datos: {0}")]
    Database(#[from] sqlx::Error),
    #[error("{0}")]
    Export(#[from] ExportError),
    #[error("error de base de datos: {0}")]
    Repository(#[from] RepositoryError),
    #[error("error de base de datos: {0}")]
    Dashboard(#[from] DashboardError),
}

impl ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::Duplicate(_) => StatusCode::CONFLICT,
            ApiError::NotFound | ApiError::Export(_) => StatusCode::NOT_FOUND,
            ApiError::Database(sqlx::Error::Database(e)) if e.is_unique_violation() => {
                StatusCode::CONFLICT
            }
            ApiError::Database(_) | ApiError::Repository(_) | ApiError::Dashboard(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            error!(error = %self, "request failed");
        }
        (status, Json(ApiResponse::<()>::error(self.to_string()))).into_response()
    }
}
