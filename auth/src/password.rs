//! Argon2id password hashing.
//!
//! Hashing is CPU-bound, so both operations run on tokio's blocking pool
//! instead of stalling the async workers.

use crate::error::{AuthError, Result};
use argon2::password_hash::{self, PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::Argon2;
use rand::rngs::OsRng;

/// Shortest accepted password, in characters.
pub const MIN_PASSWORD_LEN: usize = 6;
/// Longest accepted password, in characters.
pub const MAX_PASSWORD_LEN: usize = 72;

/// Argon2id digest with the default cost parameters and no known preimage.
const DUMMY_HASH: &str =
    "$argon2id$v=19$m=19456,t=2,p=1$Zml0Ym9vay1kdW1teS1zYWx0$XZieYo8SLMwhvGwVZCM3CSXSpQD+EJGtqGnpSKYidm4";

/// Check password length.
///
/// Passwords are not trimmed.
///
/// # Errors
///
/// Returns `Validation` if the password is outside `6..=72` characters.
pub fn validate(password: &str) -> Result<()> {
    let len = password.chars().count();
    if (MIN_PASSWORD_LEN..=MAX_PASSWORD_LEN).contains(&len) {
        Ok(())
    } else {
        Err(AuthError::Validation(format!(
            "Password must be between {MIN_PASSWORD_LEN} and {MAX_PASSWORD_LEN} characters"
        )))
    }
}

/// Hash a password into a PHC string (`$argon2id$...`).
///
/// # Errors
///
/// Returns `InternalError` if hashing fails or the blocking task is cancelled.
pub async fn hash(password: String) -> Result<String> {
    tokio::task::spawn_blocking(move || {
        let salt = SaltString::generate(&mut OsRng);
        Argon2::default()
            .hash_password(password.as_bytes(), &salt)
            .map(|hash| hash.to_string())
            .map_err(|e| AuthError::InternalError(format!("password hashing failed: {e}")))
    })
    .await
    .map_err(|e| AuthError::InternalError(format!("hashing task failed: {e}")))?
}

/// Verify a password against a stored PHC string.
///
/// # Errors
///
/// Returns `InternalError` if the stored hash is unparseable or the blocking
/// task is cancelled. A wrong password is `Ok(false)`.
pub async fn verify(password: String, stored_hash: String) -> Result<bool> {
    tokio::task::spawn_blocking(move || {
        let parsed = PasswordHash::new(&stored_hash)
            .map_err(|e| AuthError::InternalError(format!("stored hash unreadable: {e}")))?;
        match Argon2::default().verify_password(password.as_bytes(), &parsed) {
            Ok(()) => Ok(true),
            Err(password_hash::Error::Password) => Ok(false),
            Err(e) => Err(AuthError::InternalError(format!(
                "password verification failed: {e}"
            ))),
        }
    })
    .await
    .map_err(|e| AuthError::InternalError(format!("verification task failed: {e}")))?
}

/// Run one verification that cannot succeed.
///
/// Logins for unknown emails call this so they cost the same as a wrong
/// password for a real account.
///
/// # Errors
///
/// Returns `InternalError` if the blocking task is cancelled.
pub async fn verify_dummy(password: String) -> Result<()> {
    verify(password, DUMMY_HASH.to_string()).await.map(|_| ())
}
