//! `PostgreSQL` storage for Fitbook.
//!
//! - [`PostgresBookingStore`] implements [`fitbook_core::BookingStore`]; its
//!   `reserve_seat` is one transaction guarded by the
//!   `bookings_user_class_key` unique constraint and a decrement-if-positive
//!   update.
//! - [`PostgresUserRepository`] and [`PostgresSessionStore`] implement the
//!   identity providers from `fitbook-auth`.
//!
//! Schema lives in `./migrations` and is embedded at compile time.
//!
//! # Example
//!
//! ```no_run
//! use fitbook_postgres::{PoolSettings, PostgresBookingStore, connect, migrate};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let pool = connect(&PoolSettings::new("postgres://localhost/fitbook")).await?;
//! migrate(&pool).await?;
//! let store = PostgresBookingStore::new(pool);
//! # Ok(())
//! # }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod booking_store;
mod identity;

pub use booking_store::PostgresBookingStore;
pub use identity::{PostgresSessionStore, PostgresUserRepository};

use fitbook_core::StoreError;
use sqlx::postgres::{PgPool, PgPoolOptions};
use std::time::Duration;

/// Connection pool settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PoolSettings {
    /// Connection URL
    pub url: String,
    /// Maximum pool size
    pub max_connections: u32,
    /// Connections kept open while idle
    pub min_connections: u32,
    /// How long to wait for a connection
    pub connect_timeout: Duration,
}

impl PoolSettings {
    /// Settings with default pool sizing for `url`.
    #[must_use]
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            max_connections: 10,
            min_connections: 2,
            connect_timeout: Duration::from_secs(30),
        }
    }
}

/// Open a connection pool.
///
/// # Errors
///
/// Returns [`StoreError::Backend`] if the database is unreachable.
pub async fn connect(settings: &PoolSettings) -> Result<PgPool, StoreError> {
    let pool = PgPoolOptions::new()
        .max_connections(settings.max_connections)
        .min_connections(settings.min_connections)
        .acquire_timeout(settings.connect_timeout)
        .connect(&settings.url)
        .await
        .map_err(|e| StoreError::Backend(format!("Failed to connect: {e}")))?;

    tracing::info!(
        max_connections = settings.max_connections,
        min_connections = settings.min_connections,
        "Database pool ready"
    );
    Ok(pool)
}

/// Run the embedded migrations.
///
/// # Errors
///
/// Returns [`StoreError::Backend`] if a migration fails.
pub async fn migrate(pool: &PgPool) -> Result<(), StoreError> {
    sqlx::migrate!("./migrations")
        .run(pool)
        .await
        .map_err(|e| StoreError::Backend(format!("Migration failed: {e}")))?;
    tracing::info!("Database migrations applied");
    Ok(())
}
