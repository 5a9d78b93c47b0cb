//! # Fitbook Authentication
//!
//! The identity context consumed by the booking service: it turns an inbound
//! credential into a stable [`UserId`](fitbook_core::UserId) or rejects it.
//!
//! - **Signup**: name, email and password; the password is stored as an
//!   Argon2id hash and the email is lowercased.
//! - **Login**: issues an opaque bearer token. Only the token's SHA-256
//!   digest is persisted.
//! - **Authenticate**: resolves a bearer token to its user while the session
//!   is live.
//!
//! Storage sits behind [`providers::UserRepository`] and
//! [`providers::SessionStore`]; in-memory versions live in [`mocks`] behind
//! the `test-utils` feature.

#![deny(missing_docs)]
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]
#![deny(clippy::todo)]
#![deny(clippy::unimplemented)]

pub mod error;
pub mod password;
pub mod providers;
pub mod service;
pub mod token;

#[cfg(any(test, feature = "test-utils"))]
pub mod mocks;

pub use error::{AuthError, Result};
pub use providers::{Session, SessionStore, User, UserRepository};
pub use service::{
    AccessToken, DEFAULT_SESSION_TTL_SECS, IdentityService, MAX_SESSION_TTL_SECS, Signup,
};
