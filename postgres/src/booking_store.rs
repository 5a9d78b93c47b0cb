//! `PostgreSQL` booking store.

use async_trait::async_trait;
use chrono::NaiveDateTime;
use fitbook_core::types::{StoredBooking, StoredBookingDetails, StoredClass};
use fitbook_core::{BookingId, BookingStore, ClassId, Contact, ReserveOutcome, StoreError, UserId};
use sqlx::{FromRow, PgPool};
use std::time::Instant;
use uuid::Uuid;

const CLASS_FK: &str = "bookings_class_id_fkey";
const USER_FK: &str = "bookings_user_id_fkey";

/// Classes and bookings in `PostgreSQL`.
#[derive(Clone)]
pub struct PostgresBookingStore {
    pool: PgPool,
}

impl PostgresBookingStore {
    /// Create a store over an existing pool.
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(FromRow)]
struct ClassRow {
    id: Uuid,
    name: String,
    instructor: String,
    starts_at: NaiveDateTime,
    total_capacity: i32,
    available_capacity: i32,
}

impl TryFrom<ClassRow> for StoredClass {
    type Error = StoreError;

    fn try_from(row: ClassRow) -> Result<Self, Self::Error> {
        let seats = |value: i32, column: &str| {
            u32::try_from(value)
                .map_err(|_| StoreError::Corrupt(format!("class {} has {column} = {value}", row.id)))
        };
        Ok(Self {
            id: ClassId::from_uuid(row.id),
            total_capacity: seats(row.total_capacity, "total_capacity")?,
            available_capacity: seats(row.available_capacity, "available_capacity")?,
            name: row.name,
            instructor: row.instructor,
            starts_at: row.starts_at,
        })
    }
}

#[derive(FromRow)]
struct BookingDetailsRow {
    id: Uuid,
    class_id: Uuid,
    user_id: Uuid,
    client_name: String,
    client_email: String,
    booked_at: NaiveDateTime,
    class_name: String,
    instructor: String,
    class_starts_at: NaiveDateTime,
}

impl From<BookingDetailsRow> for StoredBookingDetails {
    fn from(row: BookingDetailsRow) -> Self {
        Self {
            booking: StoredBooking {
                id: BookingId::from_uuid(row.id),
                class_id: ClassId::from_uuid(row.class_id),
                user_id: UserId::from_uuid(row.user_id),
                contact: Contact::new(row.client_name, row.client_email),
                booked_at: row.booked_at,
            },
            class_name: row.class_name,
            instructor: row.instructor,
            class_starts_at: row.class_starts_at,
        }
    }
}

fn backend(context: &'static str) -> impl FnOnce(sqlx::Error) -> StoreError {
    move |e| StoreError::Backend(format!("{context}: {e}"))
}

fn seats_to_db(value: u32) -> Result<i32, StoreError> {
    i32::try_from(value).map_err(|_| StoreError::Corrupt(format!("capacity {value} out of range")))
}

#[async_trait]
impl BookingStore for PostgresBookingStore {
    async fn insert_class(&self, class: &StoredClass) -> Result<(), StoreError> {
        sqlx::query(
            r"
            INSERT INTO classes (id, name, instructor, starts_at, total_capacity, available_capacity)
            VALUES ($1, $2, $3, $4, $5, $6)
            ",
        )
        .bind(class.id.as_uuid())
        .bind(&class.name)
        .bind(&class.instructor)
        .bind(class.starts_at)
        .bind(seats_to_db(class.total_capacity)?)
        .bind(seats_to_db(class.available_capacity)?)
        .execute(&self.pool)
        .await
        .map_err(backend("Failed to insert class"))?;
        Ok(())
    }

    async fn find_class(&self, class_id: ClassId) -> Result<Option<StoredClass>, StoreError> {
        sqlx::query_as::<_, ClassRow>(
            r"
            SELECT id, name, instructor, starts_at, total_capacity, available_capacity
            FROM classes
            WHERE id = $1
            ",
        )
        .bind(class_id.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(backend("Failed to load class"))?
        .map(StoredClass::try_from)
        .transpose()
    }

    async fn classes_starting_from(
        &self,
        from: NaiveDateTime,
    ) -> Result<Vec<StoredClass>, StoreError> {
        sqlx::query_as::<_, ClassRow>(
            r"
            SELECT id, name, instructor, starts_at, total_capacity, available_capacity
            FROM classes
            WHERE starts_at >= $1
            ORDER BY starts_at ASC, id ASC
            ",
        )
        .bind(from)
        .fetch_all(&self.pool)
        .await
        .map_err(backend("Failed to list classes"))?
        .into_iter()
        .map(StoredClass::try_from)
        .collect()
    }

    async fn reserve_seat(&self, booking: &StoredBooking) -> Result<ReserveOutcome, StoreError> {
        let started = Instant::now();

        // Dropping `tx` without commit rolls back.
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(backend("Failed to start transaction"))?;

        // Step 1: uniqueness guard. A concurrent insert of the same
        // (user, class) pair blocks here until the other transaction ends.
        let inserted = sqlx::query(
            r"
            INSERT INTO bookings (id, class_id, user_id, client_name, client_email, booked_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            ON CONFLICT ON CONSTRAINT bookings_user_class_key DO NOTHING
            ",
        )
        .bind(booking.id.as_uuid())
        .bind(booking.class_id.as_uuid())
        .bind(booking.user_id.as_uuid())
        .bind(&booking.contact.name)
        .bind(&booking.contact.email)
        .bind(booking.booked_at)
        .execute(&mut *tx)
        .await;

        let inserted = match inserted {
            Ok(result) => result.rows_affected(),
            Err(sqlx::Error::Database(db_err)) if db_err.is_foreign_key_violation() => {
                return match db_err.constraint() {
                    Some(CLASS_FK) => Ok(ReserveOutcome::ClassMissing),
                    Some(USER_FK) => Ok(ReserveOutcome::UserMissing),
                    _ => Err(StoreError::Backend(format!(
                        "Failed to insert booking: {db_err}"
                    ))),
                };
            }
            Err(e) => return Err(backend("Failed to insert booking")(e)),
        };

        if inserted == 0 {
            return Ok(ReserveOutcome::Duplicate);
        }

        // Step 2: capacity guard and decrement in one statement.
        let remaining: Option<i32> = sqlx::query_scalar(
            r"
            UPDATE classes
            SET available_capacity = available_capacity - 1
            WHERE id = $1 AND available_capacity > 0
            RETURNING available_capacity
            ",
        )
        .bind(booking.class_id.as_uuid())
        .fetch_optional(&mut *tx)
        .await
        .map_err(backend("Failed to decrement capacity"))?;

        let Some(remaining) = remaining else {
            return Ok(ReserveOutcome::Exhausted);
        };
        let remaining = u32::try_from(remaining)
            .map_err(|_| StoreError::Corrupt(format!("negative capacity {remaining}")))?;

        tx.commit()
            .await
            .map_err(backend("Failed to commit reservation"))?;

        metrics::histogram!("fitbook_reserve_transaction_seconds")
            .record(started.elapsed().as_secs_f64());

        Ok(ReserveOutcome::Reserved {
            booking: booking.clone(),
            remaining,
        })
    }

    async fn bookings_for_user(
        &self,
        user_id: UserId,
    ) -> Result<Vec<StoredBookingDetails>, StoreError> {
        let rows = sqlx::query_as::<_, BookingDetailsRow>(
            r"
            SELECT b.id, b.class_id, b.user_id, b.client_name, b.client_email, b.booked_at,
                   c.name AS class_name, c.instructor, c.starts_at AS class_starts_at
            FROM bookings b
            JOIN classes c ON c.id = b.class_id
            WHERE b.user_id = $1
            ORDER BY b.booked_at DESC, b.seq DESC
            ",
        )
        .bind(user_id.as_uuid())
        .fetch_all(&self.pool)
        .await
        .map_err(backend("Failed to list bookings"))?;

        Ok(rows.into_iter().map(StoredBookingDetails::from).collect())
    }

    async fn ping(&self) -> Result<(), StoreError> {
        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await
            .map_err(backend("Database unreachable"))?;
        Ok(())
    }
}
