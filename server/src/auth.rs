//! Authentication extractor for the Fitbook service.
//!
//! # Usage
//!
//! ```rust,ignore
//! use fitbook::auth::AuthenticatedUser;
//!
//! // Require authentication
//! async fn list_bookings(
//!     user: AuthenticatedUser,
//!     State(state): State<AppState>,
//! ) -> Result<Json<Vec<BookingItem>>, AppError> {
//!     // user.user_id belongs to a live session
//!     let bookings = state.ledger.list_bookings_for_user(user.user_id).await?;
//!     ...
//! }
//! ```

use axum::{
    async_trait,
    extract::{FromRef, FromRequestParts},
    http::request::Parts,
};
use fitbook_auth::IdentityService;
use fitbook_core::UserId;
use fitbook_web::{AppError, BearerToken};

/// Caller resolved from a bearer token.
///
/// Rejects with 401 when the header is missing or malformed, or when no
/// live session matches the token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AuthenticatedUser {
    /// The authenticated user ID
    pub user_id: UserId,
}

#[async_trait]
impl<S> FromRequestParts<S> for AuthenticatedUser
where
    IdentityService: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let BearerToken(token) = BearerToken::from_request_parts(parts, state).await?;

        let identity = IdentityService::from_ref(state);
        let user_id = identity.authenticate(&token).await.map_err(|error| {
            tracing::debug!(reason = %error, "Bearer token rejected");
            AppError::from(error)
        })?;

        Ok(Self { user_id })
    }
}
