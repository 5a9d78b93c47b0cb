//! Domain types for class booking.
//!
//! Two families live here:
//!
//! - **Records** ([`ClassRecord`], [`BookingRecord`], [`BookingSummary`]) carry
//!   timestamps already normalized into the canonical zone. These are what the
//!   catalog and ledger hand back to callers.
//! - **Stored rows** ([`StoredClass`], [`StoredBooking`],
//!   [`StoredBookingDetails`]) carry canonical wall-clock `NaiveDateTime`s, the
//!   representation a [`BookingStore`](crate::store::BookingStore) persists.

use crate::clock::RawTimestamp;
use chrono::{DateTime, FixedOffset, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

// ============================================================================
// Identifiers
// ============================================================================

macro_rules! uuid_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(Uuid);

        impl $name {
            #[doc = concat!("Creates a new random `", stringify!($name), "`")]
            #[must_use]
            pub fn new() -> Self {
                Self(Uuid::new_v4())
            }

            #[doc = concat!("Create a `", stringify!($name), "` from a `Uuid`")]
            #[must_use]
            pub const fn from_uuid(uuid: Uuid) -> Self {
                Self(uuid)
            }

            /// Get the inner UUID
            #[must_use]
            pub const fn as_uuid(&self) -> &Uuid {
                &self.0
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

uuid_id!(
    /// Unique identifier for a scheduled class
    ClassId
);

uuid_id!(
    /// Unique identifier for a booking
    BookingId
);

uuid_id!(
    /// Stable user identity, as resolved by the identity context
    UserId
);

// ============================================================================
// Inputs
// ============================================================================

/// Request to schedule a new class.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewClass {
    /// Class name
    pub name: String,
    /// Instructor name
    pub instructor: String,
    /// Start time, with or without an offset
    pub starts_at: RawTimestamp,
    /// Seat capacity (must be positive)
    pub capacity: i64,
}

impl NewClass {
    /// Build a class request.
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        instructor: impl Into<String>,
        starts_at: impl Into<RawTimestamp>,
        capacity: i64,
    ) -> Self {
        Self {
            name: name.into(),
            instructor: instructor.into(),
            starts_at: starts_at.into(),
            capacity,
        }
    }
}

/// Contact details supplied at booking time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Contact {
    /// Contact name
    pub name: String,
    /// Contact email
    pub email: String,
}

impl Contact {
    /// Build contact details.
    #[must_use]
    pub fn new(name: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            email: email.into(),
        }
    }
}

// ============================================================================
// Records
// ============================================================================

/// A scheduled class.
///
/// Invariant: `available_capacity <= total_capacity`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ClassRecord {
    /// Class ID
    pub id: ClassId,
    /// Class name
    pub name: String,
    /// Instructor name
    pub instructor: String,
    /// Start time in the canonical zone
    pub starts_at: DateTime<FixedOffset>,
    /// Capacity at creation (immutable)
    pub total_capacity: u32,
    /// Seats still open
    pub available_capacity: u32,
}

/// A confirmed booking.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BookingRecord {
    /// Booking ID
    pub id: BookingId,
    /// Booked class
    pub class_id: ClassId,
    /// Booking user
    pub user_id: UserId,
    /// Contact details given at booking time
    pub contact: Contact,
    /// Creation time in the canonical zone
    pub booked_at: DateTime<FixedOffset>,
}

/// Result of a successful reservation.
///
/// `remaining_capacity` is the committed post-decrement count.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Reservation {
    /// The persisted booking
    pub booking: BookingRecord,
    /// Seats left on the class after this booking
    pub remaining_capacity: u32,
}

/// A user's booking joined with its class.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BookingSummary {
    /// Booking ID
    pub booking_id: BookingId,
    /// Class ID
    pub class_id: ClassId,
    /// Class name
    pub class_name: String,
    /// Instructor name
    pub instructor: String,
    /// Class start time in the canonical zone
    pub starts_at: DateTime<FixedOffset>,
    /// Contact details given at booking time
    pub contact: Contact,
    /// Booking time in the canonical zone
    pub booked_at: DateTime<FixedOffset>,
}

// ============================================================================
// Stored rows
// ============================================================================

/// Class row as persisted. Timestamps are canonical wall time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredClass {
    /// Class ID
    pub id: ClassId,
    /// Class name
    pub name: String,
    /// Instructor name
    pub instructor: String,
    /// Start time, canonical wall clock
    pub starts_at: NaiveDateTime,
    /// Capacity at creation
    pub total_capacity: u32,
    /// Seats still open
    pub available_capacity: u32,
}

/// Booking row as persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredBooking {
    /// Booking ID
    pub id: BookingId,
    /// Booked class
    pub class_id: ClassId,
    /// Booking user
    pub user_id: UserId,
    /// Contact details
    pub contact: Contact,
    /// Creation time, canonical wall clock
    pub booked_at: NaiveDateTime,
}

/// Booking row joined with the class columns a listing needs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredBookingDetails {
    /// The booking row
    pub booking: StoredBooking,
    /// Class name
    pub class_name: String,
    /// Instructor name
    pub instructor: String,
    /// Class start time, canonical wall clock
    pub class_starts_at: NaiveDateTime,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ids_are_unique_and_display_as_uuid() {
        let a = ClassId::new();
        let b = ClassId::new();
        assert_ne!(a, b);
        assert_eq!(a.to_string(), a.as_uuid().to_string());
    }

    #[test]
    fn test_id_serializes_transparently() {
        let uuid = Uuid::new_v4();
        let id = BookingId::from_uuid(uuid);
        let json = serde_json::to_string(&id).unwrap_or_default();
        assert_eq!(json, format!("\"{uuid}\""));
    }
}
