use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};

use crate::{model::profile::ApiResponse, validation::ValidationErrors};

pub type ApiResult<T> = Result<T, ApiError>;

pub const MISSING_FIELDS_MESSAGE: &str = "Name and email are required";
pub const VALIDATION_FAILED_MESSAGE: &str = "Validation failed";

type BoxError = Box<dyn std::error::Error + Send + Sync>;

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("{}", MISSING_FIELDS_MESSAGE)]
    MissingFields,

    #[error(transparent)]
    Validation(#[from] ValidationErrors),

    /// The client only ever sees `message`; `source` is logged.
    #[error("{message}")]
    Internal {
        message: &'static str,
        #[source]
        source: BoxError,
    },
}

impl ApiError {
    pub fn internal(message: &'static str, source: impl Into<BoxError>) -> Self {
        Self::Internal {
            message,
            source: source.into(),
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::MissingFields | ApiError::Validation(_) => StatusCode::BAD_REQUEST,
            ApiError::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = match self {
            ApiError::MissingFields => ApiResponse::failure(MISSING_FIELDS_MESSAGE, None),
            ApiError::Validation(errors) => {
                ApiResponse::failure(VALIDATION_FAILED_MESSAGE, Some(errors.into_inner()))
            }
            ApiError::Internal { message, source } => {
                tracing::error!(error = %source, "{message}");
                ApiResponse::failure(message, None)
            }
        };

        (status, Json(body)).into_response()
    }
}
