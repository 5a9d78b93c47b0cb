//! Persistence seam for classes and bookings.
//!
//! The storage engine is the only point of serialization for reservations.
//! Implementations must make [`BookingStore::reserve_seat`] a single atomic
//! unit: the duplicate check, the capacity check, the capacity decrement and
//! the booking insert either all take effect or none do.

use crate::types::{ClassId, StoredBooking, StoredBookingDetails, StoredClass, UserId};
use async_trait::async_trait;
use chrono::NaiveDateTime;
use thiserror::Error;

/// Infrastructure failure inside a store.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// The backend rejected or failed the operation.
    #[error("{0}")]
    Backend(String),

    /// A persisted row violates a domain invariant.
    #[error("corrupt row: {0}")]
    Corrupt(String),
}

/// Outcome of an atomic reservation attempt.
///
/// Everything except `Reserved` means the store applied nothing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReserveOutcome {
    /// Booking inserted and capacity decremented in one commit.
    Reserved {
        /// The booking as committed
        booking: StoredBooking,
        /// Available capacity after the decrement
        remaining: u32,
    },
    /// The (user, class) uniqueness guard rejected the insert.
    Duplicate,
    /// The decrement-if-positive update matched no row.
    Exhausted,
    /// The referenced class does not exist.
    ClassMissing,
    /// The referenced user does not exist.
    UserMissing,
}

/// Class and booking storage.
#[async_trait]
pub trait BookingStore: Send + Sync {
    /// Persist a new class.
    ///
    /// # Errors
    ///
    /// Returns error if the write fails.
    async fn insert_class(&self, class: &StoredClass) -> Result<(), StoreError>;

    /// Look up a class by ID.
    ///
    /// # Errors
    ///
    /// Returns error if the read fails.
    async fn find_class(&self, class_id: ClassId) -> Result<Option<StoredClass>, StoreError>;

    /// Classes starting at or after `from`, ascending by start time.
    ///
    /// # Errors
    ///
    /// Returns error if the read fails.
    async fn classes_starting_from(
        &self,
        from: NaiveDateTime,
    ) -> Result<Vec<StoredClass>, StoreError>;

    /// Atomically reserve one seat.
    ///
    /// The duplicate guard is evaluated before the capacity guard, so a user
    /// re-booking a full class gets [`ReserveOutcome::Duplicate`].
    ///
    /// # Errors
    ///
    /// Returns error if the transaction cannot commit. In that case nothing
    /// was applied.
    async fn reserve_seat(&self, booking: &StoredBooking) -> Result<ReserveOutcome, StoreError>;

    /// A user's bookings with class details, most recent first.
    ///
    /// # Errors
    ///
    /// Returns error if the read fails.
    async fn bookings_for_user(
        &self,
        user_id: UserId,
    ) -> Result<Vec<StoredBookingDetails>, StoreError>;

    /// Connectivity check for readiness checks.
    ///
    /// # Errors
    ///
    /// Returns error if the backend is unreachable.
    async fn ping(&self) -> Result<(), StoreError>;
}
