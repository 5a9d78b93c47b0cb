//! Wiring of stores, clock and services into an [`AppState`].
//!
//! [`build_state`] connects to `PostgreSQL` and is what the binary uses;
//! [`assemble_state`] takes already-built stores so tests can run the same
//! wiring over in-memory implementations.

use crate::config::Config;
use crate::server::state::AppState;
use anyhow::Context;
use fitbook_auth::{IdentityService, MAX_SESSION_TTL_SECS, SessionStore, UserRepository};
use fitbook_core::{
    BookingLedger, BookingStore, CanonicalZone, ClassCatalog, Clock, ScheduleClock, SystemClock,
};
use fitbook_postgres::{
    PoolSettings, PostgresBookingStore, PostgresSessionStore, PostgresUserRepository,
};
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;

/// Build the application state over the given stores.
#[must_use]
pub fn assemble_state(
    store: Arc<dyn BookingStore>,
    users: Arc<dyn UserRepository>,
    sessions: Arc<dyn SessionStore>,
    clock: Arc<dyn Clock>,
    zone: CanonicalZone,
    session_ttl: chrono::Duration,
) -> AppState {
    let schedule = ScheduleClock::new(clock.clone(), zone);

    AppState::new(
        ClassCatalog::new(store.clone(), schedule.clone()),
        BookingLedger::new(store.clone(), schedule),
        IdentityService::new(users, sessions, clock, session_ttl),
        store,
    )
}

/// Connect to `PostgreSQL`, apply migrations if enabled, and build the
/// application state.
///
/// # Errors
///
/// Returns error if the configured offset or session TTL is out of range,
/// the database is unreachable, or a migration fails.
pub async fn build_state(config: &Config) -> anyhow::Result<AppState> {
    let zone = CanonicalZone::from_offset_minutes(config.schedule.utc_offset_minutes)
        .with_context(|| {
            format!(
                "CANONICAL_UTC_OFFSET_MINUTES out of range: {}",
                config.schedule.utc_offset_minutes
            )
        })?;
    let session_ttl = config.auth.session_lifetime().with_context(|| {
        format!(
            "AUTH_SESSION_TTL must be between 1 and {MAX_SESSION_TTL_SECS} seconds, got {}",
            config.auth.session_ttl
        )
    })?;

    let settings = PoolSettings {
        max_connections: config.postgres.max_connections,
        min_connections: config.postgres.min_connections,
        connect_timeout: Duration::from_secs(config.postgres.connect_timeout),
        ..PoolSettings::new(config.postgres.url.clone())
    };

    tracing::info!("Connecting to database...");
    let pool = fitbook_postgres::connect(&settings)
        .await
        .context("Failed to connect to PostgreSQL")?;

    if config.postgres.run_migrations {
        tracing::info!("Running database migrations...");
        fitbook_postgres::migrate(&pool)
            .await
            .context("Failed to run migrations")?;
    } else {
        tracing::info!("Skipping migrations (DATABASE_RUN_MIGRATIONS=false)");
    }

    tracing::info!(offset_minutes = config.schedule.utc_offset_minutes, "Schedule clock ready");

    Ok(assemble_state(
        Arc::new(PostgresBookingStore::new(pool.clone())),
        Arc::new(PostgresUserRepository::new(pool.clone())),
        Arc::new(PostgresSessionStore::new(pool)),
        Arc::new(SystemClock::new()),
        zone,
        session_ttl,
    ))
}

/// Periodically drop expired sessions.
///
/// The first sweep runs immediately.
pub fn spawn_session_purge(identity: IdentityService, every: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(every);
        loop {
            ticker.tick().await;
            if let Err(error) = identity.purge_expired_sessions().await {
                tracing::warn!(error = %error, "Session purge failed");
            }
        }
    })
}
