//! Error type shared by every handler, mapped onto HTTP status codes.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use memvid_api_types::ErrorResponse;

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("Invalid memory name")]
    InvalidName,
    #[error("Invalid API key")]
    Unauthorized,
    #[error("Memory not found")]
    NotFound,
    #[error("Memory already exists")]
    AlreadyExists,
    /// Binary exited non-zero; carries its stderr or a generic message.
    #[error("{0}")]
    ExecutionFailed(String),
    /// Binary stdout was not a JSON object; carries the raw stdout.
    #[error("Invalid JSON: {0}")]
    MalformedOutput(String),
    #[error("Command timed out")]
    Timeout,
    #[error("Invalid upload: {0}")]
    InvalidUpload(String),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl ApiError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::InvalidName | Self::InvalidUpload(_) => StatusCode::BAD_REQUEST,
            Self::Unauthorized => StatusCode::UNAUTHORIZED,
            Self::NotFound => StatusCode::NOT_FOUND,
            Self::AlreadyExists => StatusCode::CONFLICT,
            Self::ExecutionFailed(_) | Self::MalformedOutput(_) | Self::Io(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
            Self::Timeout => StatusCode::GATEWAY_TIMEOUT,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            log::error!("Request failed ({}): {}", status, self);
        }
        (
            status,
            Json(ErrorResponse {
                detail: self.to_string(),
            }),
        )
            .into_response()
    }
}
