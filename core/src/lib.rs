//! # Fitbook Core
//!
//! Booking engine for scheduled fitness classes.
//!
//! This crate owns the three pieces of the service where correctness lives:
//!
//! - **Schedule clock** ([`clock`]): the single time-source seam and the
//!   normalizer that maps every timestamp into the canonical timezone.
//! - **Class catalog** ([`catalog`]): class creation and point-in-time
//!   "upcoming" listings.
//! - **Booking ledger** ([`ledger`]): the reserve-or-reject operation that
//!   must hold under concurrent access.
//!
//! Persistence is abstracted behind [`store::BookingStore`]. The ledger never
//! reads capacity and then writes it in separate steps; it hands the whole
//! duplicate-check / capacity-check / write sequence to the store as one
//! atomic unit and translates the outcome.
//!
//! ```text
//! reserve(user, class, contact)
//!   │
//!   ├─ validate contact                 → ValidationError
//!   ├─ store.find_class                 → NotFound
//!   ├─ clock: starts_at < now?          → ClassAlreadyStarted
//!   └─ store.reserve_seat  (one transaction)
//!        ├─ unique (user, class) insert → DuplicateBooking
//!        └─ decrement-if-positive       → CapacityExhausted
//! ```
//!
//! ## Example
//!
//! ```
//! use std::sync::Arc;
//! use chrono::{Duration, TimeZone, Utc};
//! use fitbook_core::{
//!     BookingLedger, CanonicalZone, ClassCatalog, Contact, NewClass, ScheduleClock, UserId,
//!     mocks::{FixedClock, InMemoryBookingStore},
//! };
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() {
//! let now = Utc.with_ymd_and_hms(2026, 1, 1, 9, 0, 0).unwrap();
//! let clock = ScheduleClock::new(Arc::new(FixedClock::new(now)), CanonicalZone::ist());
//! let store = Arc::new(InMemoryBookingStore::new());
//!
//! let catalog = ClassCatalog::new(store.clone(), clock.clone());
//! let ledger = BookingLedger::new(store, clock);
//!
//! let organizer = UserId::new();
//! let class = catalog
//!     .create_class(organizer, NewClass::new("HIIT Session", "Coach", now + Duration::days(1), 2))
//!     .await
//!     .unwrap();
//!
//! let reservation = ledger
//!     .reserve(UserId::new(), class.id, Contact::new("Asha", "asha@example.com"))
//!     .await
//!     .unwrap();
//! assert_eq!(reservation.remaining_capacity, 1);
//! # }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod catalog;
pub mod clock;
pub mod error;
pub mod ledger;
pub mod metrics;
pub mod store;
pub mod types;
pub mod validation;

#[cfg(any(test, feature = "test-utils"))]
pub mod mocks;

pub use catalog::ClassCatalog;
pub use clock::{CanonicalZone, Clock, RawTimestamp, ScheduleClock, SystemClock};
pub use error::{BookingError, Result};
pub use ledger::BookingLedger;
pub use store::{BookingStore, ReserveOutcome, StoreError};
pub use types::{
    BookingId, BookingRecord, BookingSummary, ClassId, ClassRecord, Contact, NewClass,
    Reservation, UserId,
};
