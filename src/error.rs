//! Error types for the Chattingo gateway.
//!
//! Defines a unified error type that maps cleanly to HTTP responses.

use axum::{
    extract::rejection::JsonRejection,
    http::{header::WWW_AUTHENTICATE, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

/// Unified error type for gateway operations.
#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("Unauthenticated: {message}")]
    Unauthenticated { code: &'static str, message: String },

    #[error("Forbidden: {message}")]
    Forbidden { code: &'static str, message: String },

    #[error("Invalid request: {message}")]
    BadRequest { code: &'static str, message: String },

    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl GatewayError {
    /// A protected route was requested without a resolvable identity.
    pub fn unauthenticated(message: impl Into<String>) -> Self {
        GatewayError::Unauthenticated {
            code: "UNAUTHENTICATED",
            message: message.into(),
        }
    }

    /// A credential was presented but rejected.
    pub fn invalid_credentials(message: impl Into<String>) -> Self {
        GatewayError::Unauthenticated {
            code: "INVALID_CREDENTIALS",
            message: message.into(),
        }
    }

    /// Stable machine-readable code carried in the response body.
    pub fn code(&self) -> &'static str {
        match self {
            GatewayError::Unauthenticated { code, .. }
            | GatewayError::Forbidden { code, .. }
            | GatewayError::BadRequest { code, .. } => code,
            GatewayError::NotFound(_) => "NOT_FOUND",
            GatewayError::Config(_) => "CONFIG_ERROR",
            GatewayError::Internal(_) => "INTERNAL_ERROR",
        }
    }
}

impl From<JsonRejection> for GatewayError {
    fn from(rejection: JsonRejection) -> Self {
        GatewayError::BadRequest {
            code: "INVALID_BODY",
            message: rejection.body_text(),
        }
    }
}

/// Error response body for API clients.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl IntoResponse for GatewayError {
    fn into_response(self) -> Response {
        let code = self.code();
        let (status, message, details) = match self {
            GatewayError::Unauthenticated { message, .. } => {
                (StatusCode::UNAUTHORIZED, message, None)
            }
            GatewayError::Forbidden { message, .. } => (StatusCode::FORBIDDEN, message, None),
            GatewayError::BadRequest { message, .. } => (StatusCode::BAD_REQUEST, message, None),
            GatewayError::NotFound(msg) => (StatusCode::NOT_FOUND, msg, None),
            GatewayError::Config(msg) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Configuration error".to_string(),
                Some(msg),
            ),
            GatewayError::Internal(msg) => {
                // Log the actual error but don't expose internals
                tracing::error!(error = %msg, "Internal error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "An internal error occurred".to_string(),
                    None,
                )
            }
        };

        let body = ErrorResponse {
            error: message,
            code: code.to_string(),
            details,
        };

        let mut response = (status, Json(body)).into_response();
        if status == StatusCode::UNAUTHORIZED {
            response
                .headers_mut()
                .insert(WWW_AUTHENTICATE, HeaderValue::from_static("Bearer"));
        }
        response
    }
}

/// Result type alias for gateway operations.
pub type GatewayResult<T> = Result<T, GatewayError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unauthenticated_maps_to_401_with_challenge() {
        let response = GatewayError::unauthenticated("Authentication required").into_response();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(response.headers().get(WWW_AUTHENTICATE).unwrap(), "Bearer");
    }

    #[test]
    fn test_internal_error_hides_details() {
        let err = GatewayError::Internal("signing key unreadable".to_string());
        assert_eq!(err.code(), "INTERNAL_ERROR");
        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert!(response.headers().get(WWW_AUTHENTICATE).is_none());
    }

    #[test]
    fn test_codes() {
        assert_eq!(GatewayError::invalid_credentials("x").code(), "INVALID_CREDENTIALS");
        assert_eq!(GatewayError::Config("x".into()).code(), "CONFIG_ERROR");
        assert_eq!(GatewayError::NotFound("x".into()).code(), "NOT_FOUND");
    }
}
