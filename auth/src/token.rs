//! Opaque bearer tokens.
//!
//! A token is 256 random bits encoded as base64url (43 characters). Only its
//! SHA-256 digest is ever persisted, so a leaked sessions table cannot be
//! replayed.

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use rand::RngCore;
use sha2::{Digest, Sha256};

/// Generate a cryptographically secure random token.
#[must_use]
pub fn generate() -> String {
    let mut rng = rand::thread_rng();
    let mut random_bytes = [0u8; 32];
    rng.fill_bytes(&mut random_bytes);
    URL_SAFE_NO_PAD.encode(random_bytes)
}

/// Digest of a token as stored in the session table (lowercase hex).
///
/// # Examples
///
/// ```
/// use fitbook_auth::token::digest;
///
/// assert_eq!(digest("abc").len(), 64);
/// assert_eq!(digest("abc"), digest("abc"));
/// assert_ne!(digest("abc"), digest("abd"));
/// ```
#[must_use]
pub fn digest(token: &str) -> String {
    Sha256::digest(token.as_bytes())
        .iter()
        .map(|byte| format!("{byte:02x}"))
        .collect()
}
