//! `PostgreSQL` user repository and session store.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use fitbook_auth::{AuthError, Result, Session, SessionStore, User, UserRepository};
use fitbook_core::UserId;
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

/// `PostgreSQL` user repository.
#[derive(Clone)]
pub struct PostgresUserRepository {
    pool: PgPool,
}

impl PostgresUserRepository {
    /// Create a new `PostgreSQL` user repository.
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(FromRow)]
struct UserRow {
    id: Uuid,
    name: String,
    email: String,
    password_hash: String,
    created_at: DateTime<Utc>,
}

impl From<UserRow> for User {
    fn from(row: UserRow) -> Self {
        Self {
            user_id: UserId::from_uuid(row.id),
            name: row.name,
            email: row.email,
            password_hash: row.password_hash,
            created_at: row.created_at,
        }
    }
}

fn database(context: &'static str) -> impl FnOnce(sqlx::Error) -> AuthError {
    move |e| AuthError::DatabaseError(format!("{context}: {e}"))
}

#[async_trait]
impl UserRepository for PostgresUserRepository {
    async fn create_user(&self, user: &User) -> Result<()> {
        let result = sqlx::query(
            r"
            INSERT INTO users (id, name, email, password_hash, created_at)
            VALUES ($1, $2, $3, $4, $5)
            ",
        )
        .bind(user.user_id.as_uuid())
        .bind(&user.name)
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(user.created_at)
        .execute(&self.pool)
        .await;

        match result {
            Ok(_) => Ok(()),
            Err(sqlx::Error::Database(db_err)) if db_err.is_unique_violation() => {
                Err(AuthError::EmailAlreadyRegistered)
            }
            Err(e) => Err(database("Failed to create user")(e)),
        }
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>> {
        let row = sqlx::query_as::<_, UserRow>(
            r"
            SELECT id, name, email, password_hash, created_at
            FROM users
            WHERE email = $1
            ",
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await
        .map_err(database("Failed to get user"))?;

        Ok(row.map(User::from))
    }
}

/// `PostgreSQL` session store.
#[derive(Clone)]
pub struct PostgresSessionStore {
    pool: PgPool,
}

impl PostgresSessionStore {
    /// Create a new `PostgreSQL` session store.
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(FromRow)]
struct SessionRow {
    token_digest: String,
    user_id: Uuid,
    created_at: DateTime<Utc>,
    expires_at: DateTime<Utc>,
}

#[async_trait]
impl SessionStore for PostgresSessionStore {
    async fn create_session(&self, session: &Session) -> Result<()> {
        sqlx::query(
            r"
            INSERT INTO sessions (token_digest, user_id, created_at, expires_at)
            VALUES ($1, $2, $3, $4)
            ",
        )
        .bind(&session.token_digest)
        .bind(session.user_id.as_uuid())
        .bind(session.created_at)
        .bind(session.expires_at)
        .execute(&self.pool)
        .await
        .map_err(database("Failed to create session"))?;
        Ok(())
    }

    async fn find_session(&self, token_digest: &str) -> Result<Option<Session>> {
        let row = sqlx::query_as::<_, SessionRow>(
            r"
            SELECT token_digest, user_id, created_at, expires_at
            FROM sessions
            WHERE token_digest = $1
            ",
        )
        .bind(token_digest)
        .fetch_optional(&self.pool)
        .await
        .map_err(database("Failed to get session"))?;

        Ok(row.map(|row| Session {
            token_digest: row.token_digest,
            user_id: UserId::from_uuid(row.user_id),
            created_at: row.created_at,
            expires_at: row.expires_at,
        }))
    }

    async fn purge_expired(&self, now: DateTime<Utc>) -> Result<u64> {
        let result = sqlx::query("DELETE FROM sessions WHERE expires_at <= $1")
            .bind(now)
            .execute(&self.pool)
            .await
            .map_err(database("Failed to purge sessions"))?;
        Ok(result.rows_affected())
    }
}
