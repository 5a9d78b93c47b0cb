//! Booking API endpoints.
//!
//! - POST /book - Reserve a seat (requires auth)
//! - GET /bookings - The caller's bookings, most recent first (requires auth)

use crate::auth::AuthenticatedUser;
use crate::server::state::AppState;
use axum::{Json, extract::State, http::StatusCode};
use chrono::{DateTime, FixedOffset};
use fitbook_core::{BookingId, BookingSummary, ClassId, Contact};
use fitbook_web::{ApiJson, AppError};
use serde::{Deserialize, Serialize};

// ============================================================================
// Request/Response Types
// ============================================================================

/// Request to reserve a seat.
#[derive(Debug, Deserialize)]
pub struct BookClassRequest {
    /// Class to book
    pub class_id: ClassId,
    /// Attendee name
    pub client_name: String,
    /// Attendee email
    pub client_email: String,
}

/// Response after a successful reservation.
#[derive(Debug, Serialize)]
pub struct BookClassResponse {
    /// Success message
    pub message: String,
    /// New booking ID
    pub booking_id: BookingId,
    /// Seats left on the class
    pub remaining_slots: u32,
}

/// One entry in the caller's booking history.
#[derive(Debug, Serialize)]
pub struct BookingItem {
    /// Booking ID
    pub booking_id: BookingId,
    /// Booked class
    pub class_id: ClassId,
    /// Class name
    pub class_name: String,
    /// Class start time
    #[serde(rename = "dateTime")]
    pub date_time: DateTime<FixedOffset>,
    /// Instructor name
    pub instructor: String,
    /// Attendee name
    pub client_name: String,
    /// Attendee email
    pub client_email: String,
    /// When the booking was made
    pub booked_at: DateTime<FixedOffset>,
}

impl From<BookingSummary> for BookingItem {
    fn from(summary: BookingSummary) -> Self {
        Self {
            booking_id: summary.booking_id,
            class_id: summary.class_id,
            class_name: summary.class_name,
            date_time: summary.starts_at,
            instructor: summary.instructor,
            client_name: summary.contact.name,
            client_email: summary.contact.email,
            booked_at: summary.booked_at,
        }
    }
}

// ============================================================================
// Handlers
// ============================================================================

/// Reserve a seat on a class for the caller.
///
/// # Example
///
/// ```bash
/// curl -X POST http://localhost:8080/book \
///   -H "Authorization: Bearer <token>" \
///   -H "Content-Type: application/json" \
///   -d '{"class_id": "<class uuid>", "client_name": "Asha Rao",
///        "client_email": "asha@example.com"}'
/// ```
///
/// # Errors
///
/// - 401 without a valid bearer token
/// - 404 if the class does not exist
/// - 400 if the class has started, is full, or a field is invalid
/// - 409 if the caller already holds a booking for the class
pub async fn book_class(
    user: AuthenticatedUser,
    State(state): State<AppState>,
    ApiJson(request): ApiJson<BookClassRequest>,
) -> Result<(StatusCode, Json<BookClassResponse>), AppError> {
    let reservation = state
        .ledger
        .reserve(
            user.user_id,
            request.class_id,
            Contact::new(request.client_name, request.client_email),
        )
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(BookClassResponse {
            message: "Booking successful".to_string(),
            booking_id: reservation.booking.id,
            remaining_slots: reservation.remaining_capacity,
        }),
    ))
}

/// List the caller's bookings.
///
/// # Errors
///
/// - 401 without a valid bearer token
/// - 500 if storage fails
pub async fn list_bookings(
    user: AuthenticatedUser,
    State(state): State<AppState>,
) -> Result<Json<Vec<BookingItem>>, AppError> {
    let bookings = state.ledger.list_bookings_for_user(user.user_id).await?;
    Ok(Json(bookings.into_iter().map(BookingItem::from).collect()))
}
