//! API error handling module
//!
//! Provides a unified error type for all API endpoints with structured error variants.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use postbox_core::PostboxError;
use thiserror::Error;

use crate::store::StoreError;

/// API error type with structured variants for different error categories
#[derive(Debug, Error)]
pub enum ApiError {
    /// Bad request - client provided invalid input
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Unauthorized - wrong or missing admin password
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Not found - requested resource does not exist
    #[error("Not found: {0}")]
    NotFound(String),

    /// Internal server error - unexpected server-side failure
    #[error("Internal error: {0}")]
    Internal(String),

    /// Service unavailable - the record store cannot be reached
    #[error("Service unavailable: {0}")]
    ServiceUnavailable(String),

    /// Record store failure
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    /// Engine error - invalid query parameters or unparseable records
    #[error("Postbox error: {0}")]
    Postbox(#[from] PostboxError),
}

impl ApiError {
    /// Create a bad request error
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::BadRequest(message.into())
    }

    /// Create an unauthorized error
    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::Unauthorized(message.into())
    }

    /// Create a not found error
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound(message.into())
    }

    /// Create an internal server error
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    /// Create a service unavailable error
    pub fn service_unavailable(message: impl Into<String>) -> Self {
        Self::ServiceUnavailable(message.into())
    }

    /// Get the HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Internal(_) | Self::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::ServiceUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            Self::Postbox(ref e) => match e {
                // Client-provided invalid input → 400
                PostboxError::InvalidSortKey(_)
                | PostboxError::InvalidMapMode(_)
                | PostboxError::InvalidCardType(_)
                | PostboxError::SerializationError(_) => StatusCode::BAD_REQUEST,

                // Server-side configuration or I/O → 500
                PostboxError::InvalidConfig(_) | PostboxError::Io(_) => {
                    StatusCode::INTERNAL_SERVER_ERROR
                }
            },
        }
    }

    /// Get the error code for programmatic error handling
    fn error_code(&self) -> &'static str {
        match self {
            Self::BadRequest(_) => "INVALID_INPUT",
            Self::Unauthorized(_) => "UNAUTHORIZED",
            Self::NotFound(_) => "NOT_FOUND",
            Self::Internal(_) => "INTERNAL_ERROR",
            Self::ServiceUnavailable(_) => "SERVICE_UNAVAILABLE",
            Self::Store(_) => "STORE_ERROR",
            Self::Postbox(ref e) => match e {
                PostboxError::InvalidSortKey(_) => "INVALID_SORT_KEY",
                PostboxError::InvalidMapMode(_) => "INVALID_MAP_MODE",
                PostboxError::InvalidCardType(_) => "INVALID_CARD_TYPE",
                PostboxError::SerializationError(_) => "INVALID_JSON",
                PostboxError::InvalidConfig(_) => "CONFIG_ERROR",
                PostboxError::Io(_) => "IO_ERROR",
            },
        }
    }

    /// Get sanitized error message for client response
    fn client_message(&self) -> String {
        match self {
            // Store internals (connection strings, SQL) stay in the logs
            Self::Store(_) => "Record store operation failed".to_string(),
            Self::Internal(_) => "Internal server error".to_string(),
            Self::Postbox(PostboxError::InvalidConfig(_) | PostboxError::Io(_)) => {
                "Server configuration error".to_string()
            }
            _ => self.to_string(),
        }
    }

    /// Get the error category for logging
    fn error_category(&self) -> &'static str {
        match self {
            Self::BadRequest(_) => "bad_request",
            Self::Unauthorized(_) => "unauthorized",
            Self::NotFound(_) => "not_found",
            Self::Internal(_) => "internal",
            Self::ServiceUnavailable(_) => "service_unavailable",
            Self::Store(_) => "store",
            Self::Postbox(_) => "postbox",
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let category = self.error_category();
        let code = self.error_code();
        let internal_message = self.to_string();
        let client_message = self.client_message();

        // Log based on severity, always including internal details
        if status.is_server_error() {
            tracing::error!(
                status = %status,
                category = category,
                code = code,
                error = %internal_message,
                "Server error"
            );
        } else if status == StatusCode::UNAUTHORIZED {
            tracing::warn!(
                status = %status,
                category = category,
                code = code,
                error = %internal_message,
                "Authentication error"
            );
        } else {
            tracing::warn!(
                status = %status,
                category = category,
                code = code,
                error = %internal_message,
                "Client error"
            );
        }

        // Same envelope as successful writes, plus a `code` for programmatic handling
        let body = serde_json::json!({
            "success": false,
            "message": client_message,
            "code": code,
        });

        (status, Json(body)).into_response()
    }
}
