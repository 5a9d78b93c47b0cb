//! Mock user repository for testing.

use crate::error::{AuthError, Result};
use crate::providers::{User, UserRepository};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

/// Mock user repository.
///
/// Uses in-memory storage for testing. Users are indexed by email, which is
/// the uniqueness key.
#[derive(Debug, Clone, Default)]
pub struct MockUserRepository {
    users_by_email: Arc<Mutex<HashMap<String, User>>>,
}

impl MockUserRepository {
    /// Create a new mock user repository.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Get count of stored users (for testing).
    ///
    /// # Errors
    ///
    /// Returns error if lock is poisoned.
    pub fn user_count(&self) -> Result<usize> {
        Ok(self.lock()?.len())
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, HashMap<String, User>>> {
        self.users_by_email
            .lock()
            .map_err(|_| AuthError::InternalError("Mutex lock failed".to_string()))
    }
}

#[async_trait]
impl UserRepository for MockUserRepository {
    async fn create_user(&self, user: &User) -> Result<()> {
        let mut users = self.lock()?;
        if users.contains_key(&user.email) {
            return Err(AuthError::EmailAlreadyRegistered);
        }
        users.insert(user.email.clone(), user.clone());
        Ok(())
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>> {
        Ok(self.lock()?.get(email).cloned())
    }
}
