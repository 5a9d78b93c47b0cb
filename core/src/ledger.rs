//! Booking ledger: the reserve-or-reject operation.
//!
//! Preconditions are checked in a fixed order, each with its own signal:
//!
//! 1. class exists → else `NotFound`
//! 2. normalized start time ≥ now → else `ClassAlreadyStarted`
//! 3. no booking for (user, class) → else `DuplicateBooking`
//! 4. available capacity > 0 → else `CapacityExhausted`
//!
//! Steps 1 and 2 read immutable data (classes are never deleted and their
//! start time never changes), so they can run outside the transaction.
//! Steps 3 and 4 and the write are delegated to
//! [`BookingStore::reserve_seat`] as one atomic unit. The ledger holds no
//! locks of its own and never retries: rejections are terminal.

use crate::clock::ScheduleClock;
use crate::error::{BookingError, Result};
use crate::metrics;
use crate::store::{BookingStore, ReserveOutcome};
use crate::types::{
    BookingId, BookingRecord, BookingSummary, ClassId, Contact, Reservation, StoredBooking,
    UserId,
};
use crate::validation;
use std::sync::Arc;

/// Reserves seats and lists a user's bookings.
#[derive(Clone)]
pub struct BookingLedger {
    store: Arc<dyn BookingStore>,
    clock: ScheduleClock,
}

impl BookingLedger {
    /// Create a ledger over a store.
    #[must_use]
    pub fn new(store: Arc<dyn BookingStore>, clock: ScheduleClock) -> Self {
        Self { store, clock }
    }

    /// Reserve one seat on `class_id` for `user_id`.
    ///
    /// On success the booking is committed and `remaining_capacity` is the
    /// count that commit left behind. On any error nothing was persisted.
    ///
    /// # Errors
    ///
    /// - `Validation` if the contact name or email is malformed
    /// - `NotFound` if the class (or user) does not exist
    /// - `ClassAlreadyStarted` if the class start time is before now
    /// - `DuplicateBooking` if the user already booked this class
    /// - `CapacityExhausted` if no seats are left
    /// - `Storage` if the transaction could not commit
    #[tracing::instrument(skip(self, contact), fields(user_id = %user_id, class_id = %class_id))]
    pub async fn reserve(
        &self,
        user_id: UserId,
        class_id: ClassId,
        contact: Contact,
    ) -> Result<Reservation> {
        let result = self.try_reserve(user_id, class_id, contact).await;

        match &result {
            Ok(reservation) => {
                metrics::record_booking_reserved(class_id, reservation.remaining_capacity);
                tracing::info!(
                    booking_id = %reservation.booking.id,
                    remaining = reservation.remaining_capacity,
                    "Seat reserved"
                );
            }
            Err(error) => {
                metrics::record_booking_rejected(error);
                if let BookingError::Storage(cause) = error {
                    tracing::error!(error = %cause, "Reservation failed, transaction rolled back");
                } else {
                    tracing::debug!(reason = %error, "Reservation rejected");
                }
            }
        }

        result
    }

    async fn try_reserve(
        &self,
        user_id: UserId,
        class_id: ClassId,
        contact: Contact,
    ) -> Result<Reservation> {
        let contact = Contact {
            name: validation::name("Client name", &contact.name)?,
            email: validation::email(&contact.email)?,
        };

        let class = self
            .store
            .find_class(class_id)
            .await?
            .ok_or_else(|| BookingError::class_not_found(class_id))?;

        let now = self.clock.now();
        if self.clock.normalize(class.starts_at) < now {
            return Err(BookingError::ClassAlreadyStarted);
        }

        let booking = StoredBooking {
            id: BookingId::new(),
            class_id,
            user_id,
            contact,
            booked_at: self.clock.to_storage(now),
        };

        match self.store.reserve_seat(&booking).await? {
            ReserveOutcome::Reserved { booking, remaining } => Ok(Reservation {
                booking: BookingRecord {
                    id: booking.id,
                    class_id: booking.class_id,
                    user_id: booking.user_id,
                    contact: booking.contact,
                    booked_at: self.clock.normalize(booking.booked_at),
                },
                remaining_capacity: remaining,
            }),
            ReserveOutcome::Duplicate => Err(BookingError::DuplicateBooking),
            ReserveOutcome::Exhausted => Err(BookingError::CapacityExhausted),
            ReserveOutcome::ClassMissing => Err(BookingError::class_not_found(class_id)),
            ReserveOutcome::UserMissing => Err(BookingError::user_not_found(user_id)),
        }
    }

    /// The user's bookings joined with their classes, most recent first.
    ///
    /// # Errors
    ///
    /// Returns `Storage` if the read fails.
    pub async fn list_bookings_for_user(&self, user_id: UserId) -> Result<Vec<BookingSummary>> {
        let rows = self.store.bookings_for_user(user_id).await?;

        Ok(rows
            .into_iter()
            .map(|row| BookingSummary {
                booking_id: row.booking.id,
                class_id: row.booking.class_id,
                class_name: row.class_name,
                instructor: row.instructor,
                starts_at: self.clock.normalize(row.class_starts_at),
                contact: row.booking.contact,
                booked_at: self.clock.normalize(row.booking.booked_at),
            })
            .collect())
    }
}
