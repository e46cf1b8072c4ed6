use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use std::fmt;

use crate::auth::token::AuthError;
use crate::services::pipeline::PipelineError;
use crate::services::user_store::CredentialError;

/// A lightweight wrapper for request-terminal errors that keeps the message
/// local. `category` is a stable machine-readable tag; `message` is safe to
/// show to clients (no internal paths, no source chains).
#[derive(Debug)]
pub struct AppError {
    pub status: StatusCode,
    pub category: &'static str,
    pub message: String,
}

impl AppError {
    /// Create a new AppError with a specific status, category and message.
    pub fn new(status: StatusCode, category: &'static str, msg: impl Into<String>) -> Self {
        Self {
            status,
            category,
            message: msg.into(),
        }
    }

    /// Shortcut for a 500 Internal Server Error
    pub fn internal(msg: impl Into<String>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, "internal", msg)
    }

    /// Shortcut for 400 Bad Request
    pub fn bad_request(msg: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, "request", msg)
    }

    /// Shortcut for 401 Unauthorized
    pub fn unauthorized(msg: impl Into<String>) -> Self {
        Self::new(StatusCode::UNAUTHORIZED, "auth", msg)
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for AppError {}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let body = Json(json!({
            "error": self.message,
            "category": self.category,
            "status": self.status.as_u16()
        }));

        (self.status, body).into_response()
    }
}

impl From<AuthError> for AppError {
    fn from(err: AuthError) -> Self {
        AppError::unauthorized(err.to_string())
    }
}

impl From<CredentialError> for AppError {
    fn from(err: CredentialError) -> Self {
        match err {
            CredentialError::InvalidUsernameOrPassword => {
                AppError::new(StatusCode::UNAUTHORIZED, "credentials", err.to_string())
            }
            CredentialError::DuplicateUsername(_) => {
                AppError::new(StatusCode::BAD_REQUEST, "credentials", err.to_string())
            }
            CredentialError::Store(_) => AppError::internal("error accessing account store"),
        }
    }
}

impl From<PipelineError> for AppError {
    fn from(err: PipelineError) -> Self {
        // The Display impls of the pipeline variants carry no source detail,
        // so the client sees only the failed stage.
        AppError::new(StatusCode::INTERNAL_SERVER_ERROR, "pipeline", err.to_string())
    }
}

impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        AppError::internal(err.to_string())
    }
}
