//! Axum integration for Fitbook.
//!
//! Shared HTTP plumbing used by the server binary:
//!
//! - [`AppError`]: one error type for every handler, mapping the domain
//!   taxonomy onto status codes and a `{code, message}` body
//! - [`extractors`]: correlation ID, bearer token, and body extractors that
//!   reject with `AppError`
//! - [`middleware`]: correlation ID propagation and per-request spans
//!
//! # Request Flow
//!
//! ```text
//! request ─► correlation_id_layer ─► extractors ─► handler ─► catalog / ledger
//!                 │ span + header        │ AppError on rejection      │
//!                 ◄──────────────────────┴──── Result<_, AppError> ◄──┘
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs, clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod error;
pub mod extractors;
pub mod middleware;

pub use error::AppError;
pub use extractors::{ApiForm, ApiJson, BearerToken, CorrelationId};
pub use middleware::{CORRELATION_ID_HEADER, correlation_id_layer};
