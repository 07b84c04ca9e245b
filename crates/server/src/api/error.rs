//! Error responses of the HTTP API.

use agora_core::validation::FieldError;
use agora_core::{ApiError, ClassroomError, ProgressError, SubmitError, ValidationErrors};
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Api(#[from] ApiError),

    #[error(transparent)]
    Invalid(#[from] ValidationErrors),

    #[error(transparent)]
    Classroom(#[from] ClassroomError),

    #[error("{0}")]
    Forbidden(String),

    #[error("{0}")]
    Unprocessable(String),
}

impl From<SubmitError> for AppError {
    fn from(err: SubmitError) -> Self {
        match err {
            SubmitError::Invalid(errors) => AppError::Invalid(errors),
            SubmitError::Api(err) => AppError::Api(err),
        }
    }
}

impl From<ProgressError> for AppError {
    fn from(err: ProgressError) -> Self {
        match err {
            ProgressError::Api(err) => AppError::Api(err),
            other @ ProgressError::LessonOutOfRange { .. } => {
                AppError::Unprocessable(other.to_string())
            }
        }
    }
}

/// Body of every error answer.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    /// `"not_found"` when the resource does not exist.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub state: Option<&'static str>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub fields: Vec<FieldError>,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            state: None,
            fields: Vec::new(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, body) = match self {
            AppError::Api(err) => {
                let status = match &err {
                    ApiError::NotFound(_) => StatusCode::NOT_FOUND,
                    ApiError::Unauthorized => StatusCode::UNAUTHORIZED,
                    ApiError::Forbidden(_) => StatusCode::FORBIDDEN,
                    ApiError::Api { status, .. } if (400..500).contains(status) => {
                        StatusCode::from_u16(*status).unwrap_or(StatusCode::BAD_GATEWAY)
                    }
                    _ => StatusCode::BAD_GATEWAY,
                };
                let mut body = ErrorResponse::new(err.user_message());
                if err.is_not_found() {
                    body.state = Some("not_found");
                }
                (status, body)
            }
            AppError::Invalid(errors) => {
                let mut body = ErrorResponse::new("Please correct the highlighted fields");
                body.fields = errors.iter().cloned().collect();
                (StatusCode::UNPROCESSABLE_ENTITY, body)
            }
            AppError::Classroom(err) => (StatusCode::NOT_FOUND, ErrorResponse::new(err.to_string())),
            AppError::Forbidden(message) => (StatusCode::FORBIDDEN, ErrorResponse::new(message)),
            AppError::Unprocessable(message) => {
                (StatusCode::UNPROCESSABLE_ENTITY, ErrorResponse::new(message))
            }
        };

        (status, Json(body)).into_response()
    }
}
