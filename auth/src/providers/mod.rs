//! Identity storage providers.
//!
//! These traits abstract over where accounts and sessions live. The
//! [`IdentityService`](crate::IdentityService) depends only on the traits;
//! production wires in the PostgreSQL implementations and tests use the
//! in-memory mocks.

use chrono::{DateTime, Utc};
use fitbook_core::UserId;
use serde::{Deserialize, Serialize};

pub mod session;
pub mod user;

pub use session::SessionStore;
pub use user::UserRepository;

/// User account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    /// User ID.
    pub user_id: UserId,

    /// Display name.
    pub name: String,

    /// Email address, lowercased.
    pub email: String,

    /// Argon2id PHC string.
    #[serde(skip_serializing)]
    pub password_hash: String,

    /// Account created timestamp.
    pub created_at: DateTime<Utc>,
}

/// Login session, keyed by the digest of its bearer token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    /// SHA-256 hex digest of the bearer token.
    pub token_digest: String,

    /// Session owner.
    pub user_id: UserId,

    /// Issue time.
    pub created_at: DateTime<Utc>,

    /// The session is rejected at or after this instant.
    pub expires_at: DateTime<Utc>,
}

impl Session {
    /// Whether the session is still usable at `now`.
    #[must_use]
    pub fn is_active_at(&self, now: DateTime<Utc>) -> bool {
        now < self.expires_at
    }
}
