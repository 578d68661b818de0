use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use tracing::error;

use crate::users::repo::StoreError;

/// Errors surfaced to HTTP clients. There is no not-found variant: lookups
/// report absence as an empty result or a zero count.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// Missing or malformed field; 400.
    #[error("{0}")]
    Validation(String),
    /// Store unavailable or any other unexpected failure; 500.
    #[error(transparent)]
    Store(#[from] anyhow::Error),
}

impl From<StoreError> for AppError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::Duplicate(user_id) => {
                AppError::Validation(format!("Duplicate user_id: {user_id}"))
            }
            StoreError::Backend(e) => AppError::Store(e),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        match self {
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, msg).into_response(),
            AppError::Store(e) => {
                error!(error = %e, "store failure");
                (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()).into_response()
            }
        }
    }
}
