//! Class API endpoints.
//!
//! - POST /classes - Schedule a class (requires auth)
//! - GET /classes - Upcoming classes, soonest first
//! - GET /classes/:id - One class, past or upcoming

use crate::auth::AuthenticatedUser;
use crate::server::state::AppState;
use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use chrono::{DateTime, FixedOffset};
use fitbook_core::{ClassId, ClassRecord, NewClass, RawTimestamp};
use fitbook_web::{ApiJson, AppError};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ============================================================================
// Request/Response Types
// ============================================================================

/// Request to schedule a class.
///
/// `dateTime` without an offset is read as wall time in the canonical zone.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateClassRequest {
    /// Class name
    pub name: String,
    /// Start time
    pub date_time: RawTimestamp,
    /// Instructor name
    pub instructor: String,
    /// Seats offered
    pub available_slots: i64,
}

/// Class details response.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClassResponse {
    /// Class ID
    pub id: ClassId,
    /// Class name
    pub name: String,
    /// Start time in the canonical offset
    pub date_time: DateTime<FixedOffset>,
    /// Instructor name
    pub instructor: String,
    /// Seats still open
    pub available_slots: u32,
    /// Seats offered
    pub total_slots: u32,
}

impl From<ClassRecord> for ClassResponse {
    fn from(class: ClassRecord) -> Self {
        Self {
            id: class.id,
            name: class.name,
            date_time: class.starts_at,
            instructor: class.instructor,
            available_slots: class.available_capacity,
            total_slots: class.total_capacity,
        }
    }
}

// ============================================================================
// Handlers
// ============================================================================

/// Schedule a new class.
///
/// # Example
///
/// ```bash
/// curl -X POST http://localhost:8080/classes \
///   -H "Authorization: Bearer <token>" \
///   -H "Content-Type: application/json" \
///   -d '{"name": "HIIT Session", "dateTime": "2026-02-10T18:30:00",
///        "instructor": "Coach", "availableSlots": 2}'
/// ```
///
/// # Errors
///
/// - 401 without a valid bearer token
/// - 400 for invalid fields or a start time that is not in the future
pub async fn create_class(
    user: AuthenticatedUser,
    State(state): State<AppState>,
    ApiJson(request): ApiJson<CreateClassRequest>,
) -> Result<(StatusCode, Json<ClassResponse>), AppError> {
    let class = state
        .catalog
        .create_class(
            user.user_id,
            NewClass::new(
                request.name,
                request.instructor,
                request.date_time,
                request.available_slots,
            ),
        )
        .await?;

    Ok((StatusCode::CREATED, Json(class.into())))
}

/// List upcoming classes.
///
/// # Example
///
/// ```bash
/// curl http://localhost:8080/classes
/// ```
///
/// # Errors
///
/// Returns 500 if storage fails.
pub async fn list_classes(
    State(state): State<AppState>,
) -> Result<Json<Vec<ClassResponse>>, AppError> {
    let classes = state.catalog.list_upcoming_classes().await?;
    Ok(Json(classes.into_iter().map(ClassResponse::from).collect()))
}

/// Get one class.
///
/// # Errors
///
/// Returns 404 if the ID is malformed or unknown.
pub async fn get_class(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ClassResponse>, AppError> {
    let class_id = Uuid::parse_str(&id)
        .map(ClassId::from_uuid)
        .map_err(|_| AppError::not_found("Class", &id))?;

    let class = state.catalog.get_class(class_id).await?;
    Ok(Json(class.into()))
}
