//! Application state for the Fitbook HTTP server.
//!
//! Contains all shared resources needed by HTTP handlers:
//! - Class catalog and booking ledger (the booking engine)
//! - Identity service (for signup, login and bearer resolution)
//! - The booking store itself, for readiness checks

use axum::extract::FromRef;
use fitbook_auth::IdentityService;
use fitbook_core::{BookingLedger, BookingStore, ClassCatalog};
use std::sync::Arc;

/// Application state shared across all HTTP handlers.
///
/// Cloned for each request; every field is a cheap handle.
#[derive(Clone)]
pub struct AppState {
    /// Class creation and upcoming listings
    pub catalog: ClassCatalog,

    /// Reserve-or-reject and booking history
    pub ledger: BookingLedger,

    /// Accounts and sessions
    pub identity: IdentityService,

    /// Storage handle used by `/ready`
    pub store: Arc<dyn BookingStore>,
}

impl AppState {
    /// Create a new application state.
    #[must_use]
    pub fn new(
        catalog: ClassCatalog,
        ledger: BookingLedger,
        identity: IdentityService,
        store: Arc<dyn BookingStore>,
    ) -> Self {
        Self {
            catalog,
            ledger,
            identity,
            store,
        }
    }
}

// Lets the auth extractor borrow the identity service directly
impl FromRef<AppState> for IdentityService {
    fn from_ref(app_state: &AppState) -> Self {
        app_state.identity.clone()
    }
}
