//! Error types for web handlers.
//!
//! [`AppError`] bridges the domain errors (`BookingError`, `AuthError`) and
//! HTTP responses. Client errors carry their domain message; server errors
//! are logged with their source and answered with a generic message so that
//! storage details never reach the client.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use fitbook_auth::AuthError;
use fitbook_core::BookingError;
use serde::Serialize;
use std::fmt;

const GENERIC_INTERNAL: &str = "An internal error occurred";

/// Application error type for web handlers.
///
/// # Examples
///
/// ```
/// use fitbook_web::AppError;
/// use axum::http::StatusCode;
///
/// let err = AppError::not_found("Class", "42");
/// assert_eq!(err.status(), StatusCode::NOT_FOUND);
/// assert_eq!(err.to_string(), "[NOT_FOUND] Class with id 42 not found");
/// ```
#[derive(Debug)]
pub struct AppError {
    /// HTTP status code
    status: StatusCode,
    /// Error message (user-facing)
    message: String,
    /// Error code (for client error handling)
    code: &'static str,
    /// Internal error (for logging, not exposed to client)
    source: Option<anyhow::Error>,
}

impl AppError {
    /// Create a new application error.
    #[must_use]
    pub fn new(status: StatusCode, message: impl Into<String>, code: &'static str) -> Self {
        Self {
            status,
            message: message.into(),
            code,
            source: None,
        }
    }

    /// Create a new error with a source error.
    #[must_use]
    pub fn with_source(mut self, source: anyhow::Error) -> Self {
        self.source = Some(source);
        self
    }

    /// HTTP status of this error.
    #[must_use]
    pub const fn status(&self) -> StatusCode {
        self.status
    }

    /// Machine-readable error code.
    #[must_use]
    pub const fn code(&self) -> &'static str {
        self.code
    }

    /// User-facing message.
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Create a 400 Bad Request error for malformed input.
    #[must_use]
    pub fn validation(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message, "VALIDATION_ERROR")
    }

    /// Create a 401 Unauthorized error.
    #[must_use]
    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new(StatusCode::UNAUTHORIZED, message, "UNAUTHORIZED")
    }

    /// Create a 404 Not Found error.
    #[must_use]
    pub fn not_found(resource: impl fmt::Display, id: impl fmt::Display) -> Self {
        Self::new(
            StatusCode::NOT_FOUND,
            format!("{resource} with id {id} not found"),
            "NOT_FOUND",
        )
    }

    /// Create a 409 Conflict error.
    #[must_use]
    pub fn conflict(message: impl Into<String>, code: &'static str) -> Self {
        Self::new(StatusCode::CONFLICT, message, code)
    }

    /// Create a 500 Internal Server Error.
    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, message, "INTERNAL_SERVER_ERROR")
    }

    /// Create a 503 Service Unavailable error.
    #[must_use]
    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::new(StatusCode::SERVICE_UNAVAILABLE, message, "SERVICE_UNAVAILABLE")
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.code, self.message)
    }
}

impl std::error::Error for AppError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source
            .as_ref()
            .map(|e| e.as_ref() as &(dyn std::error::Error + 'static))
    }
}

/// Error response body (JSON).
#[derive(Debug, Serialize)]
struct ErrorResponse {
    /// Error code (for client error handling).
    code: &'static str,
    /// Human-readable error message.
    message: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        if self.status.is_server_error() {
            if let Some(source) = &self.source {
                tracing::error!(
                    status = %self.status,
                    code = self.code,
                    message = %self.message,
                    error = %source,
                    "Internal server error"
                );
            } else {
                tracing::error!(
                    status = %self.status,
                    code = self.code,
                    message = %self.message,
                    "Internal server error"
                );
            }
        }

        let body = ErrorResponse {
            code: self.code,
            message: self.message,
        };

        (self.status, Json(body)).into_response()
    }
}

/// Convert `anyhow::Error` to `AppError`.
impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        Self::internal(GENERIC_INTERNAL).with_source(err)
    }
}

impl From<BookingError> for AppError {
    fn from(err: BookingError) -> Self {
        match err {
            BookingError::Validation(message) => Self::validation(message),
            BookingError::NotFound { resource, id } => Self::not_found(resource, id),
            BookingError::Unauthenticated => Self::unauthorized(err.to_string()),
            BookingError::DuplicateBooking => Self::conflict(err.to_string(), "DUPLICATE_BOOKING"),
            BookingError::CapacityExhausted => {
                Self::new(StatusCode::BAD_REQUEST, err.to_string(), "CAPACITY_EXHAUSTED")
            }
            BookingError::ClassAlreadyStarted => {
                Self::new(StatusCode::BAD_REQUEST, err.to_string(), "CLASS_ALREADY_STARTED")
            }
            BookingError::Storage(cause) => {
                Self::internal(GENERIC_INTERNAL).with_source(anyhow::anyhow!(cause))
            }
        }
    }
}

impl From<AuthError> for AppError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::Validation(message) => Self::validation(message),
            AuthError::InvalidCredentials => Self::unauthorized("Invalid email or password"),
            AuthError::Unauthenticated => Self::unauthorized(err.to_string()),
            AuthError::EmailAlreadyRegistered => {
                Self::conflict(err.to_string(), "EMAIL_ALREADY_REGISTERED")
            }
            AuthError::DatabaseError(_) | AuthError::InternalError(_) => {
                Self::internal(GENERIC_INTERNAL).with_source(anyhow::Error::new(err))
            }
        }
    }
}
