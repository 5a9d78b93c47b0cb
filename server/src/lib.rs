//! # Fitbook
//!
//! HTTP service for booking seats on scheduled fitness classes.
//!
//! ```text
//! HTTP (axum)
//!   ├─ /signup, /login, /login-json ──► IdentityService ──► users, sessions
//!   ├─ /classes ─────────────────────► ClassCatalog    ─┐
//!   └─ /book, /bookings ─────────────► BookingLedger   ─┴► BookingStore (PostgreSQL)
//!                                          │
//!                                    ScheduleClock (canonical zone)
//! ```
//!
//! The booking engine lives in `fitbook-core`; this crate adds configuration,
//! wiring, the bearer-token extractor, and the JSON contract.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod api;
pub mod auth;
pub mod bootstrap;
pub mod config;
pub mod server;

pub use bootstrap::{assemble_state, build_state};
pub use config::Config;
pub use server::{AppState, build_router};
