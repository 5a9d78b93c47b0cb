//! Session store trait.

use super::Session;
use crate::error::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};

/// Session store.
///
/// # Implementation Notes
///
/// - Sessions are looked up by token digest, never by raw token
/// - Expiry is decided by the caller against its own clock; stores may
///   still return expired rows
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Create session.
    ///
    /// # Errors
    ///
    /// Returns error if the write fails or the digest already exists.
    async fn create_session(&self, session: &Session) -> Result<()>;

    /// Get session by token digest.
    ///
    /// # Errors
    ///
    /// Returns error if the read fails.
    async fn find_session(&self, token_digest: &str) -> Result<Option<Session>>;

    /// Delete sessions that expired before `now`.
    ///
    /// # Returns
    ///
    /// Number of sessions removed.
    ///
    /// # Errors
    ///
    /// Returns error if the delete fails.
    async fn purge_expired(&self, now: DateTime<Utc>) -> Result<u64>;
}
