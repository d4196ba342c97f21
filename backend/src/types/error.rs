//! Errors raised by the HTTP layer
//!
//! GraphQL execution errors travel inside the GraphQL response. [`AppError`] covers
//! everything rejected before a request reaches the schema and renders as
//! `{ "allowRetry": bool, "error": { "code": str, "message": str } }`.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

/// Request rejected before GraphQL execution
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum AppError {
    /// No bearer token in the `Authorization` header
    #[error("Authorization header must contain a valid Bearer token")]
    MissingToken,
    /// The token failed verification
    #[error("Invalid or expired token")]
    InvalidToken,
    /// A protected handler ran without a verified caller
    #[error("Authentication required")]
    MissingCaller,
    /// Authentication is enabled but no verifier was configured
    #[error("Identity verification is not configured")]
    AuthNotConfigured,
}

impl AppError {
    /// Machine-readable error code
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::MissingToken => "missing_token",
            Self::InvalidToken => "invalid_token",
            Self::MissingCaller => "missing_auth",
            Self::AuthNotConfigured => "auth_not_configured",
        }
    }

    /// HTTP status of the rejection
    #[must_use]
    pub const fn status(self) -> StatusCode {
        match self {
            Self::MissingToken | Self::InvalidToken | Self::MissingCaller => {
                StatusCode::UNAUTHORIZED
            }
            Self::AuthNotConfigured => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ErrorEnvelope {
    allow_retry: bool,
    error: ErrorBody,
}

#[derive(Serialize)]
struct ErrorBody {
    code: &'static str,
    message: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(code = self.code(), "Request rejected: {self}");
        } else {
            tracing::warn!(code = self.code(), "Request rejected: {self}");
        }

        let envelope = ErrorEnvelope {
            allow_retry: false,
            error: ErrorBody {
                code: self.code(),
                message: self.to_string(),
            },
        };

        (status, Json(envelope)).into_response()
    }
}
