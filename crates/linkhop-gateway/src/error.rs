use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use linkhop_shortener::ShortenerError;
use thiserror::Error;
use tracing::error;

use crate::model::ErrorResponse;

pub type Result<T> = std::result::Result<T, AppError>;

/// Errors returned by JSON endpoints, rendered as `{"error": "..."}`.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("{0}")]
    BadRequest(String),
    #[error(transparent)]
    Shortener(#[from] ShortenerError),
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::Shortener(e) => match e {
                ShortenerError::EmptyUrl
                | ShortenerError::InvalidUrl(_)
                | ShortenerError::InvalidShortCode(_)
                | ShortenerError::ShortCodeTooLong { .. } => StatusCode::BAD_REQUEST,
                ShortenerError::ShortCodeExists(_) => StatusCode::CONFLICT,
                ShortenerError::UrlNotFound(_) => StatusCode::NOT_FOUND,
                ShortenerError::CacheUnavailable => StatusCode::SERVICE_UNAVAILABLE,
                ShortenerError::RandomSourceUnavailable(_) | ShortenerError::Internal(_) => {
                    StatusCode::INTERNAL_SERVER_ERROR
                }
            },
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = if status == StatusCode::INTERNAL_SERVER_ERROR {
            error!(error = %self, "request failed");
            "internal server error".to_string()
        } else {
            self.to_string()
        };

        (status, Json(ErrorResponse { error: message })).into_response()
    }
}
