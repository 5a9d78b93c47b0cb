//! Account API endpoints.
//!
//! - POST /signup - Register an account
//! - POST /login - Form login (`username`/`password`, OAuth2 password flow)
//! - POST /login-json - JSON login (`email`/`password`)

use crate::server::state::AppState;
use axum::{Json, extract::State, http::StatusCode};
use chrono::{DateTime, Utc};
use fitbook_auth::{AccessToken, Signup};
use fitbook_core::UserId;
use fitbook_web::{ApiForm, ApiJson, AppError};
use serde::{Deserialize, Serialize};

// ============================================================================
// Request/Response Types
// ============================================================================

/// Request to register an account.
#[derive(Debug, Deserialize)]
pub struct SignupRequest {
    /// Display name
    pub name: String,
    /// Login email
    pub email: String,
    /// Plaintext password
    pub password: String,
}

/// Response after registering.
#[derive(Debug, Serialize)]
pub struct SignupResponse {
    /// Success message
    pub message: String,
    /// New account ID
    pub user_id: UserId,
}

/// JSON login request.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    /// Login email
    pub email: String,
    /// Plaintext password
    pub password: String,
}

/// Form login request. Extra OAuth2 fields (`grant_type`, `scope`) are ignored.
#[derive(Debug, Deserialize)]
pub struct LoginForm {
    /// Login email
    pub username: String,
    /// Plaintext password
    pub password: String,
}

/// Issued bearer token.
#[derive(Debug, Serialize)]
pub struct TokenResponse {
    /// Opaque bearer token
    pub access_token: String,
    /// Always `bearer`
    pub token_type: &'static str,
    /// Session expiry
    pub expires_at: DateTime<Utc>,
}

impl From<AccessToken> for TokenResponse {
    fn from(token: AccessToken) -> Self {
        Self {
            access_token: token.token,
            token_type: "bearer",
            expires_at: token.expires_at,
        }
    }
}

// ============================================================================
// Handlers
// ============================================================================

/// Register an account.
///
/// # Example
///
/// ```bash
/// curl -X POST http://localhost:8080/signup \
///   -H "Content-Type: application/json" \
///   -d '{"name": "Asha Rao", "email": "asha@example.com", "password": "s3cret!"}'
/// ```
///
/// # Errors
///
/// - 400 for an invalid name, email or password
/// - 409 if the email is already registered
pub async fn signup(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<SignupRequest>,
) -> Result<(StatusCode, Json<SignupResponse>), AppError> {
    let user = state
        .identity
        .signup(Signup {
            name: request.name,
            email: request.email,
            password: request.password,
        })
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(SignupResponse {
            message: "Signup successful".to_string(),
            user_id: user.user_id,
        }),
    ))
}

/// Log in with a URL-encoded form.
///
/// # Example
///
/// ```bash
/// curl -X POST http://localhost:8080/login \
///   -d 'username=asha@example.com&password=s3cret!'
/// ```
///
/// # Errors
///
/// Returns 401 for an unknown email or wrong password.
pub async fn login_form(
    State(state): State<AppState>,
    ApiForm(form): ApiForm<LoginForm>,
) -> Result<Json<TokenResponse>, AppError> {
    let token = state.identity.login(&form.username, &form.password).await?;
    Ok(Json(token.into()))
}

/// Log in with a JSON body.
///
/// # Example
///
/// ```bash
/// curl -X POST http://localhost:8080/login-json \
///   -H "Content-Type: application/json" \
///   -d '{"email": "asha@example.com", "password": "s3cret!"}'
/// ```
///
/// # Errors
///
/// Returns 401 for an unknown email or wrong password.
pub async fn login_json(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<LoginRequest>,
) -> Result<Json<TokenResponse>, AppError> {
    let token = state
        .identity
        .login(&request.email, &request.password)
        .await?;
    Ok(Json(token.into()))
}
