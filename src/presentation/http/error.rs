use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use utoipa::ToSchema;

use crate::application::use_cases::files::FileError;

#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorBody {
    pub error: String,
}

/// JSON `{error}` response.
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub message: String,
}

impl ApiError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }

    /// Maps a use-case failure. `error_message` is the configured prefix for
    /// metadata failures; `fallback` is the operation's generic 500 text.
    pub fn from_file_error(err: FileError, error_message: &str, fallback: &str) -> Self {
        match err {
            FileError::Validation(msg) => Self::bad_request(msg),
            FileError::NotFound => Self::new(StatusCode::NOT_FOUND, "File not found"),
            FileError::Metadata { code, .. } => Self::new(
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("{error_message}{code}"),
            ),
            FileError::Storage(_) => Self::new(StatusCode::INTERNAL_SERVER_ERROR, fallback),
            FileError::Unknown(e) => {
                tracing::error!(error = ?e, "unexpected_file_error");
                Self::new(StatusCode::INTERNAL_SERVER_ERROR, fallback)
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (
            self.status,
            Json(ErrorBody {
                error: self.message,
            }),
        )
            .into_response()
    }
}
