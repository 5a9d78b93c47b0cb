//! Signup, login and token authentication.

use crate::error::{AuthError, Result};
use crate::password;
use crate::providers::{Session, SessionStore, User, UserRepository};
use crate::token;
use chrono::{DateTime, Duration, Utc};
use fitbook_core::{Clock, UserId, validation};
use serde::Serialize;
use std::sync::Arc;

/// Shortest accepted signup name.
pub const MIN_SIGNUP_NAME_LEN: usize = 2;
/// Longest accepted signup name.
pub const MAX_SIGNUP_NAME_LEN: usize = 100;

/// Default session lifetime in seconds (24 hours).
pub const DEFAULT_SESSION_TTL_SECS: i64 = 86_400;
/// Longest configurable session lifetime in seconds (one year).
pub const MAX_SESSION_TTL_SECS: i64 = 365 * 86_400;

/// Signup input.
#[derive(Debug, Clone)]
pub struct Signup {
    /// Display name
    pub name: String,
    /// Email address
    pub email: String,
    /// Plaintext password
    pub password: String,
}

/// A freshly issued bearer token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AccessToken {
    /// The raw token. Only returned once; the store keeps its digest.
    pub token: String,
    /// Token owner
    pub user_id: UserId,
    /// Expiry instant
    pub expires_at: DateTime<Utc>,
}

/// Identity context: turns credentials into a stable [`UserId`].
#[derive(Clone)]
pub struct IdentityService {
    users: Arc<dyn UserRepository>,
    sessions: Arc<dyn SessionStore>,
    clock: Arc<dyn Clock>,
    session_ttl: Duration,
}

impl IdentityService {
    /// Create an identity service.
    #[must_use]
    pub fn new(
        users: Arc<dyn UserRepository>,
        sessions: Arc<dyn SessionStore>,
        clock: Arc<dyn Clock>,
        session_ttl: Duration,
    ) -> Self {
        Self {
            users,
            sessions,
            clock,
            session_ttl,
        }
    }

    /// Register a new account.
    ///
    /// # Errors
    ///
    /// - `Validation` for a bad name, email or password
    /// - `EmailAlreadyRegistered` if the (lowercased) email is taken
    /// - `DatabaseError` / `InternalError` on infrastructure failure
    #[tracing::instrument(skip(self, request))]
    pub async fn signup(&self, request: Signup) -> Result<User> {
        let name = validation::text_field(
            "Name",
            &request.name,
            MIN_SIGNUP_NAME_LEN,
            MAX_SIGNUP_NAME_LEN,
        )?;
        let email = validation::email(&request.email)?;
        password::validate(&request.password)?;

        let user = User {
            user_id: UserId::new(),
            name,
            email,
            password_hash: password::hash(request.password).await?,
            created_at: self.clock.now(),
        };

        self.users.create_user(&user).await?;
        tracing::info!(user_id = %user.user_id, "Account created");

        Ok(user)
    }

    /// Exchange credentials for a bearer token.
    ///
    /// # Errors
    ///
    /// - `InvalidCredentials` for an unknown email or wrong password
    /// - `InternalError` if the session expiry is not representable
    /// - `DatabaseError` / `InternalError` on infrastructure failure
    #[tracing::instrument(skip(self, email, password))]
    pub async fn login(&self, email: &str, password: &str) -> Result<AccessToken> {
        let email = email.trim().to_lowercase();
        let Some(user) = self.users.find_by_email(&email).await? else {
            password::verify_dummy(password.to_string()).await?;
            tracing::debug!("Login for unknown email");
            return Err(AuthError::InvalidCredentials);
        };

        if !password::verify(password.to_string(), user.password_hash.clone()).await? {
            tracing::debug!(user_id = %user.user_id, "Login with wrong password");
            return Err(AuthError::InvalidCredentials);
        }

        let now = self.clock.now();
        let expires_at = now
            .checked_add_signed(self.session_ttl)
            .ok_or_else(|| AuthError::InternalError("session expiry out of range".to_string()))?;

        let raw = token::generate();
        let session = Session {
            token_digest: token::digest(&raw),
            user_id: user.user_id,
            created_at: now,
            expires_at,
        };
        self.sessions.create_session(&session).await?;

        tracing::info!(user_id = %user.user_id, expires_at = %session.expires_at, "Session issued");

        Ok(AccessToken {
            token: raw,
            user_id: user.user_id,
            expires_at: session.expires_at,
        })
    }

    /// Resolve a bearer token to its user.
    ///
    /// # Errors
    ///
    /// - `Unauthenticated` if no live session matches the token
    /// - `DatabaseError` on infrastructure failure
    pub async fn authenticate(&self, bearer: &str) -> Result<UserId> {
        let session = self
            .sessions
            .find_session(&token::digest(bearer))
            .await?
            .ok_or(AuthError::Unauthenticated)?;

        if !session.is_active_at(self.clock.now()) {
            return Err(AuthError::Unauthenticated);
        }

        Ok(session.user_id)
    }

    /// Drop expired sessions.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` on infrastructure failure.
    pub async fn purge_expired_sessions(&self) -> Result<u64> {
        let removed = self.sessions.purge_expired(self.clock.now()).await?;
        if removed > 0 {
            tracing::debug!(removed, "Expired sessions purged");
        }
        Ok(removed)
    }
}
