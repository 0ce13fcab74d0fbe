//! Shared error handling for API endpoints.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use tracing::error;

use crate::auth::AuthError;

/// Extension trait for concise error mapping on Results.
pub trait ResultExt<T> {
    fn store_err(self, msg: &str) -> Result<T, ApiError>;
    fn signing_err(self, msg: &str) -> Result<T, ApiError>;
}

impl<T, E: std::fmt::Display> ResultExt<T> for Result<T, E> {
    fn store_err(self, msg: &str) -> Result<T, ApiError> {
        self.map_err(|e| ApiError::store_error(msg, e))
    }
    fn signing_err(self, msg: &str) -> Result<T, ApiError> {
        self.map_err(|e| ApiError::signing_error(msg, e))
    }
}

/// API error type with automatic response conversion.
#[derive(Debug)]
pub enum ApiError {
    Auth(AuthError),
    Internal(String),
}

impl ApiError {
    pub fn store_error(context: &str, e: impl std::fmt::Display) -> Self {
        error!("{}: {}", context, e);
        Self::Internal("Token store error".into())
    }

    pub fn signing_error(context: &str, e: impl std::fmt::Display) -> Self {
        error!("{}: {}", context, e);
        Self::Internal("Failed to generate token".into())
    }
}

impl From<AuthError> for ApiError {
    fn from(e: AuthError) -> Self {
        Self::Auth(e)
    }
}

#[derive(Serialize)]
struct ErrorResponse {
    error: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::Auth(e) => e.into_response(),
            ApiError::Internal(msg) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse { error: msg }),
            )
                .into_response(),
        }
    }
}
