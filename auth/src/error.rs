//! Error types for identity operations.

use fitbook_core::BookingError;
use thiserror::Error;

/// Result type alias for identity operations.
pub type Result<T> = std::result::Result<T, AuthError>;

/// Failure modes of the identity context.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AuthError {
    // ═══════════════════════════════════════════════════════════
    // Authentication Errors
    // ═══════════════════════════════════════════════════════════

    /// Unknown email or wrong password. The two cases are not distinguished.
    #[error("Invalid credentials")]
    InvalidCredentials,

    /// Missing, unknown or expired bearer token.
    #[error("Authentication required")]
    Unauthenticated,

    // ═══════════════════════════════════════════════════════════
    // Registration Errors
    // ═══════════════════════════════════════════════════════════

    /// An account with this email already exists.
    #[error("Email already registered")]
    EmailAlreadyRegistered,

    /// Malformed signup or login input.
    #[error("{0}")]
    Validation(String),

    // ═══════════════════════════════════════════════════════════
    // System Errors
    // ═══════════════════════════════════════════════════════════

    /// Database operation failed.
    #[error("Database error: {0}")]
    DatabaseError(String),

    /// Internal server error (should not be exposed to users).
    #[error("Internal error: {0}")]
    InternalError(String),
}

impl AuthError {
    /// Returns `true` if this error is due to invalid user input.
    ///
    /// # Examples
    ///
    /// ```
    /// # use fitbook_auth::AuthError;
    /// assert!(AuthError::InvalidCredentials.is_user_error());
    /// assert!(!AuthError::DatabaseError("timeout".into()).is_user_error());
    /// ```
    #[must_use]
    pub const fn is_user_error(&self) -> bool {
        matches!(
            self,
            Self::InvalidCredentials
                | Self::Unauthenticated
                | Self::EmailAlreadyRegistered
                | Self::Validation(_)
        )
    }
}

impl From<BookingError> for AuthError {
    fn from(error: BookingError) -> Self {
        match error {
            BookingError::Validation(message) => Self::Validation(message),
            BookingError::Unauthenticated => Self::Unauthenticated,
            other => Self::InternalError(other.to_string()),
        }
    }
}
