//! Mock session store for testing.

use crate::error::{AuthError, Result};
use crate::providers::{Session, SessionStore};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

/// Mock session store.
///
/// Uses in-memory storage for testing.
#[derive(Debug, Clone, Default)]
pub struct MockSessionStore {
    sessions: Arc<Mutex<HashMap<String, Session>>>,
}

impl MockSessionStore {
    /// Create a new mock session store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Get count of stored sessions (for testing).
    ///
    /// # Errors
    ///
    /// Returns error if lock is poisoned.
    pub fn session_count(&self) -> Result<usize> {
        Ok(self.lock()?.len())
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, HashMap<String, Session>>> {
        self.sessions
            .lock()
            .map_err(|_| AuthError::InternalError("Mutex lock failed".to_string()))
    }
}

#[async_trait]
impl SessionStore for MockSessionStore {
    async fn create_session(&self, session: &Session) -> Result<()> {
        let mut sessions = self.lock()?;
        if sessions.contains_key(&session.token_digest) {
            return Err(AuthError::DatabaseError(
                "Session digest already exists".to_string(),
            ));
        }
        sessions.insert(session.token_digest.clone(), session.clone());
        Ok(())
    }

    async fn find_session(&self, token_digest: &str) -> Result<Option<Session>> {
        Ok(self.lock()?.get(token_digest).cloned())
    }

    async fn purge_expired(&self, now: DateTime<Utc>) -> Result<u64> {
        let mut sessions = self.lock()?;
        let before = sessions.len();
        sessions.retain(|_, session| session.is_active_at(now));
        Ok((before - sessions.len()) as u64)
    }
}
