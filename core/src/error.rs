//! Error taxonomy for catalog and ledger operations.

use thiserror::Error;

/// Result type alias for booking operations.
pub type Result<T> = std::result::Result<T, BookingError>;

/// Every way a catalog or ledger call can fail.
///
/// `DuplicateBooking`, `CapacityExhausted` and `ClassAlreadyStarted` are
/// expected, user-facing rejections. Only `Storage` indicates a defect or an
/// infrastructure problem, and it never carries a partially applied change.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum BookingError {
    /// Malformed or out-of-range input. No state changed.
    #[error("{0}")]
    Validation(String),

    /// Referenced resource does not exist.
    #[error("{resource} with id {id} not found")]
    NotFound {
        /// Kind of resource ("class", "user")
        resource: &'static str,
        /// Identifier that was looked up
        id: String,
    },

    /// Caller identity missing or invalid.
    #[error("Authentication required")]
    Unauthenticated,

    /// The user already holds a booking for this class.
    #[error("Already booked this class")]
    DuplicateBooking,

    /// No seats left.
    #[error("No slots available")]
    CapacityExhausted,

    /// The class start time has passed.
    #[error("Cannot book a class that has already started")]
    ClassAlreadyStarted,

    /// The storage transaction could not commit. Nothing was applied.
    #[error("Storage failure: {0}")]
    Storage(String),
}

impl BookingError {
    /// Shorthand for a missing class.
    #[must_use]
    pub fn class_not_found(id: impl ToString) -> Self {
        Self::NotFound {
            resource: "Class",
            id: id.to_string(),
        }
    }

    /// Shorthand for a missing user.
    #[must_use]
    pub fn user_not_found(id: impl ToString) -> Self {
        Self::NotFound {
            resource: "User",
            id: id.to_string(),
        }
    }

    /// Whether this is an expected rejection rather than a failure.
    #[must_use]
    pub const fn is_rejection(&self) -> bool {
        matches!(
            self,
            Self::DuplicateBooking | Self::CapacityExhausted | Self::ClassAlreadyStarted
        )
    }
}

impl From<crate::store::StoreError> for BookingError {
    fn from(err: crate::store::StoreError) -> Self {
        Self::Storage(err.to_string())
    }
}
