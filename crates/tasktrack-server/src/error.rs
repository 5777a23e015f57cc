//! HTTP-facing error type.
//!
//! Every failure a handler can produce maps onto one of these variants, and
//! every variant maps onto a status code plus a short JSON `{"message": ..}`
//! body. Internal detail is logged where the error is converted, never echoed
//! to the client.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;

use tasktrack_auth::AuthError;
use tasktrack_core::CoreError;
use tasktrack_storage::StorageError;

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Malformed or missing request fields. 400.
    #[error("{0}")]
    Validation(String),

    /// Missing, invalid, or expired credentials. 401.
    #[error("{0}")]
    Unauthorized(String),

    /// The record is absent or owned by someone else. 404.
    #[error("{0}")]
    NotFound(String),

    /// A uniqueness constraint was violated. 409.
    #[error("{0}")]
    Conflict(String),

    /// Anything the caller cannot fix. 500 with a generic message.
    #[error("Internal server error")]
    Internal,
}

impl ApiError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::Unauthorized(message.into())
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound(message.into())
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        Self::Conflict(message.into())
    }

    pub fn status(&self) -> StatusCode {
        match self {
            Self::Validation(_) => StatusCode::BAD_REQUEST,
            Self::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Conflict(_) => StatusCode::CONFLICT,
            Self::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = json!({ "message": self.to_string() });
        (self.status(), Json(body)).into_response()
    }
}

impl From<CoreError> for ApiError {
    fn from(err: CoreError) -> Self {
        if err.is_client_error() {
            Self::Validation(err.to_string())
        } else {
            tracing::error!(error = %err, "core error");
            Self::Internal
        }
    }
}

impl From<StorageError> for ApiError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::NotFound { .. } => Self::NotFound("Task not found".to_string()),
            StorageError::AlreadyExists { .. } => {
                Self::Conflict("Record already exists".to_string())
            }
            other => {
                tracing::error!(error = %other, "storage error");
                Self::Internal
            }
        }
    }
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::TokenExpired | AuthError::InvalidToken { .. } => {
                Self::Unauthorized("Invalid or expired token".to_string())
            }
            AuthError::PasswordHash { .. } => {
                tracing::error!(error = %err, "password hashing error");
                Self::Internal
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn statuses_match_variants() {
        assert_eq!(
            ApiError::validation("x").status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ApiError::unauthorized("x").status(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(ApiError::not_found("x").status(), StatusCode::NOT_FOUND);
        assert_eq!(ApiError::conflict("x").status(), StatusCode::CONFLICT);
        assert_eq!(
            ApiError::Internal.status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn storage_errors_never_leak_detail() {
        let err: ApiError = StorageError::internal("connection string with password").into();
        assert_eq!(err.to_string(), "Internal server error");
    }

    #[test]
    fn expired_token_maps_to_unauthorized() {
        let err: ApiError = AuthError::TokenExpired.into();
        assert_eq!(err.status(), StatusCode::UNAUTHORIZED);
    }
}
