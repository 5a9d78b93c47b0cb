//! Router configuration for the Fitbook service.
//!
//! Builds the complete Axum router with all endpoints.

use super::health::{health_check, readiness_check};
use super::state::AppState;
use crate::api::{accounts, bookings, classes};
use axum::{
    Router,
    routing::{get, post},
};
use fitbook_web::correlation_id_layer;
use tower_http::trace::TraceLayer;

/// Build the complete Axum router.
///
/// Configures all routes including:
/// - Health checks
/// - Account endpoints (signup, form and JSON login)
/// - Class endpoints
/// - Booking endpoints
///
/// Every response carries an `X-Correlation-ID` header.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        // Health checks (no authentication)
        .route("/", get(health_check))
        .route("/health", get(health_check))
        .route("/ready", get(readiness_check))
        // Accounts
        .route("/signup", post(accounts::signup))
        .route("/login", post(accounts::login_form))
        .route("/login-json", post(accounts::login_json))
        // Classes
        .route(
            "/classes",
            post(classes::create_class).get(classes::list_classes),
        )
        .route("/classes/:id", get(classes::get_class))
        // Bookings
        .route("/book", post(bookings::book_class))
        .route("/bookings", get(bookings::list_bookings))
        .layer(TraceLayer::new_for_http())
        .layer(correlation_id_layer())
        .with_state(state)
}
