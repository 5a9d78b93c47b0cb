//! Business metrics for class booking.
//!
//! Recorded through the `metrics` facade; nothing is exported unless the
//! host process installs a recorder.
//!
//! # Exported Metrics
//!
//! - `fitbook_bookings_total{outcome}` - Reservation attempts by outcome
//!   (`reserved`, `duplicate`, `exhausted`, `started`, `not_found`, `invalid`,
//!   `failed`)
//! - `fitbook_classes_created_total` - Classes scheduled
//! - `fitbook_class_available_seats{class_id}` - Seats left after the last
//!   successful booking

use crate::error::BookingError;
use crate::types::ClassId;
use metrics::{describe_counter, describe_gauge};

/// Register metric descriptions. Call once at startup.
pub fn register_business_metrics() {
    describe_counter!(
        "fitbook_bookings_total",
        "Reservation attempts by outcome (reserved, duplicate, exhausted, started, not_found, invalid, failed)"
    );
    describe_counter!(
        "fitbook_classes_created_total",
        "Total number of classes scheduled"
    );
    describe_gauge!(
        "fitbook_class_available_seats",
        "Seats left on a class after its most recent booking"
    );

    tracing::info!("Business metrics registered");
}

/// Label for a failed reservation.
#[must_use]
pub const fn outcome_label(error: &BookingError) -> &'static str {
    match error {
        BookingError::DuplicateBooking => "duplicate",
        BookingError::CapacityExhausted => "exhausted",
        BookingError::ClassAlreadyStarted => "started",
        BookingError::NotFound { .. } => "not_found",
        BookingError::Validation(_) | BookingError::Unauthenticated => "invalid",
        BookingError::Storage(_) => "failed",
    }
}

/// Record a committed reservation.
pub fn record_booking_reserved(class_id: ClassId, remaining: u32) {
    metrics::counter!("fitbook_bookings_total", "outcome" => "reserved").increment(1);
    metrics::gauge!("fitbook_class_available_seats", "class_id" => class_id.to_string())
        .set(f64::from(remaining));
}

/// Record a rejected or failed reservation.
pub fn record_booking_rejected(error: &BookingError) {
    metrics::counter!("fitbook_bookings_total", "outcome" => outcome_label(error)).increment(1);
}

/// Record a class creation.
pub fn record_class_created() {
    metrics::counter!("fitbook_classes_created_total").increment(1);
}
