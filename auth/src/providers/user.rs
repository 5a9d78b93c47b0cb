//! User repository trait.

use super::User;
use crate::error::Result;
use async_trait::async_trait;

/// User repository.
///
/// Email uniqueness must be enforced by the store itself so that two
/// concurrent signups for one address cannot both succeed.
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Create user.
    ///
    /// # Errors
    ///
    /// Returns error if:
    /// - Email already exists → `AuthError::EmailAlreadyRegistered`
    /// - Database query fails
    async fn create_user(&self, user: &User) -> Result<()>;

    /// Get user by (lowercased) email.
    ///
    /// # Errors
    ///
    /// Returns error if database query fails.
    async fn find_by_email(&self, email: &str) -> Result<Option<User>>;
}
