//! In-memory implementations for testing.
//!
//! [`InMemoryBookingStore`] serializes every operation behind one mutex, which
//! plays the role the database transaction plays in production: the
//! duplicate check, capacity check, decrement and insert happen under a
//! single lock acquisition.

use crate::clock::Clock;
use crate::store::{BookingStore, ReserveOutcome, StoreError};
use crate::types::{ClassId, StoredBooking, StoredBookingDetails, StoredClass, UserId};
use async_trait::async_trait;
use chrono::{DateTime, Duration, NaiveDateTime, Utc};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, RwLock};

/// Settable clock for deterministic tests.
///
/// # Example
///
/// ```
/// use fitbook_core::{Clock, mocks::FixedClock};
/// use chrono::{Duration, Utc};
///
/// let start = Utc::now();
/// let clock = FixedClock::new(start);
/// assert_eq!(clock.now(), clock.now());
///
/// clock.advance(Duration::minutes(5));
/// assert_eq!(clock.now(), start + Duration::minutes(5));
/// ```
#[derive(Debug, Clone)]
pub struct FixedClock {
    time: Arc<RwLock<DateTime<Utc>>>,
}

impl FixedClock {
    /// Create a new fixed clock with the given time
    #[must_use]
    pub fn new(time: DateTime<Utc>) -> Self {
        Self {
            time: Arc::new(RwLock::new(time)),
        }
    }

    /// Move the clock to `time`.
    pub fn set(&self, time: DateTime<Utc>) {
        if let Ok(mut guard) = self.time.write() {
            *guard = time;
        }
    }

    /// Move the clock forward.
    pub fn advance(&self, by: Duration) {
        if let Ok(mut guard) = self.time.write() {
            *guard += by;
        }
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.time
            .read()
            .map_or_else(|poisoned| *poisoned.into_inner(), |guard| *guard)
    }
}

#[derive(Debug, Default)]
struct State {
    classes: HashMap<ClassId, StoredClass>,
    /// Insertion order doubles as the tiebreak for equal `booked_at`.
    bookings: Vec<StoredBooking>,
}

/// Mutex-serialized booking store.
#[derive(Debug, Clone, Default)]
pub struct InMemoryBookingStore {
    state: Arc<Mutex<State>>,
    fail_next_reserve: Arc<AtomicBool>,
    unreachable: Arc<AtomicBool>,
}

impl InMemoryBookingStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Make the next `reserve_seat` that passes its checks fail with a
    /// backend error instead of committing.
    pub fn fail_next_reserve(&self) {
        self.fail_next_reserve.store(true, Ordering::SeqCst);
    }

    /// Make `ping` fail until reset.
    pub fn set_unreachable(&self, unreachable: bool) {
        self.unreachable.store(unreachable, Ordering::SeqCst);
    }

    /// Number of stored classes (for testing).
    #[must_use]
    pub fn class_count(&self) -> usize {
        self.lock().map_or(0, |state| state.classes.len())
    }

    /// Number of bookings held for a class (for testing).
    #[must_use]
    pub fn bookings_for_class(&self, class_id: ClassId) -> usize {
        self.lock().map_or(0, |state| {
            state
                .bookings
                .iter()
                .filter(|b| b.class_id == class_id)
                .count()
        })
    }

    fn lock(&self) -> Result<MutexGuard<'_, State>, StoreError> {
        self.state
            .lock()
            .map_err(|_| StoreError::Backend("in-memory store lock poisoned".to_string()))
    }
}

#[async_trait]
impl BookingStore for InMemoryBookingStore {
    async fn insert_class(&self, class: &StoredClass) -> Result<(), StoreError> {
        let mut state = self.lock()?;
        state.classes.insert(class.id, class.clone());
        Ok(())
    }

    async fn find_class(&self, class_id: ClassId) -> Result<Option<StoredClass>, StoreError> {
        Ok(self.lock()?.classes.get(&class_id).cloned())
    }

    async fn classes_starting_from(
        &self,
        from: NaiveDateTime,
    ) -> Result<Vec<StoredClass>, StoreError> {
        let state = self.lock()?;
        let mut classes: Vec<StoredClass> = state
            .classes
            .values()
            .filter(|c| c.starts_at >= from)
            .cloned()
            .collect();
        classes.sort_by_key(|c| c.starts_at);
        Ok(classes)
    }

    async fn reserve_seat(&self, booking: &StoredBooking) -> Result<ReserveOutcome, StoreError> {
        let mut state = self.lock()?;

        if state
            .bookings
            .iter()
            .any(|b| b.user_id == booking.user_id && b.class_id == booking.class_id)
        {
            return Ok(ReserveOutcome::Duplicate);
        }

        let Some(class) = state.classes.get_mut(&booking.class_id) else {
            return Ok(ReserveOutcome::ClassMissing);
        };
        if class.available_capacity == 0 {
            return Ok(ReserveOutcome::Exhausted);
        }
        let remaining = class.available_capacity - 1;

        if self.fail_next_reserve.swap(false, Ordering::SeqCst) {
            // Nothing has been written yet, so dropping the guard is the rollback.
            return Err(StoreError::Backend("simulated commit failure".to_string()));
        }

        class.available_capacity = remaining;
        state.bookings.push(booking.clone());

        Ok(ReserveOutcome::Reserved {
            booking: booking.clone(),
            remaining,
        })
    }

    async fn bookings_for_user(
        &self,
        user_id: UserId,
    ) -> Result<Vec<StoredBookingDetails>, StoreError> {
        let state = self.lock()?;
        let mut rows: Vec<StoredBookingDetails> = state
            .bookings
            .iter()
            .rev()
            .filter(|b| b.user_id == user_id)
            .filter_map(|b| {
                let class = state.classes.get(&b.class_id)?;
                Some(StoredBookingDetails {
                    booking: b.clone(),
                    class_name: class.name.clone(),
                    instructor: class.instructor.clone(),
                    class_starts_at: class.starts_at,
                })
            })
            .collect();
        // Stable sort keeps reverse insertion order among equal timestamps.
        rows.sort_by(|a, b| b.booking.booked_at.cmp(&a.booking.booked_at));
        Ok(rows)
    }

    async fn ping(&self) -> Result<(), StoreError> {
        if self.unreachable.load(Ordering::SeqCst) {
            return Err(StoreError::Backend("in-memory store unreachable".to_string()));
        }
        self.lock().map(|_| ())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::types::{BookingId, Contact};
    use chrono::NaiveDate;

    fn at(hour: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2026, 5, 1)
            .unwrap()
            .and_hms_opt(hour, 0, 0)
            .unwrap()
    }

    fn class(capacity: u32) -> StoredClass {
        StoredClass {
            id: ClassId::new(),
            name: "Pilates".to_string(),
            instructor: "Coach".to_string(),
            starts_at: at(18),
            total_capacity: capacity,
            available_capacity: capacity,
        }
    }

    fn booking(class_id: ClassId, user_id: UserId) -> StoredBooking {
        StoredBooking {
            id: BookingId::new(),
            class_id,
            user_id,
            contact: Contact::new("Test", "test@example.com"),
            booked_at: at(9),
        }
    }

    #[tokio::test]
    async fn test_reserve_decrements_and_records() {
        let store = InMemoryBookingStore::new();
        let class = class(1);
        store.insert_class(&class).await.unwrap();

        let outcome = store
            .reserve_seat(&booking(class.id, UserId::new()))
            .await
            .unwrap();
        assert!(matches!(outcome, ReserveOutcome::Reserved { remaining: 0, .. }));

        let outcome = store
            .reserve_seat(&booking(class.id, UserId::new()))
            .await
            .unwrap();
        assert_eq!(outcome, ReserveOutcome::Exhausted);
        assert_eq!(store.bookings_for_class(class.id), 1);
    }

    #[tokio::test]
    async fn test_missing_class() {
        let store = InMemoryBookingStore::new();
        let outcome = store
            .reserve_seat(&booking(ClassId::new(), UserId::new()))
            .await
            .unwrap();
        assert_eq!(outcome, ReserveOutcome::ClassMissing);
    }

    #[tokio::test]
    async fn test_classes_starting_from_filters_and_sorts() {
        let store = InMemoryBookingStore::new();
        let mut early = class(1);
        early.starts_at = at(7);
        let mut late = class(1);
        late.starts_at = at(20);
        let mut past = class(1);
        past.starts_at = at(5);
        for c in [&late, &past, &early] {
            store.insert_class(c).await.unwrap();
        }

        let ids: Vec<ClassId> = store
            .classes_starting_from(at(7))
            .await
            .unwrap()
            .into_iter()
            .map(|c| c.id)
            .collect();
        assert_eq!(ids, vec![early.id, late.id]);
    }
}
