//! Class catalog: scheduling and browsing classes.

use crate::clock::ScheduleClock;
use crate::error::{BookingError, Result};
use crate::store::BookingStore;
use crate::types::{ClassId, ClassRecord, NewClass, StoredClass, UserId};
use crate::validation;
use std::sync::Arc;

/// Creates classes and answers schedule queries.
#[derive(Clone)]
pub struct ClassCatalog {
    store: Arc<dyn BookingStore>,
    clock: ScheduleClock,
}

impl ClassCatalog {
    /// Create a catalog over a store.
    #[must_use]
    pub fn new(store: Arc<dyn BookingStore>, clock: ScheduleClock) -> Self {
        Self { store, clock }
    }

    /// Schedule a new class with all seats open.
    ///
    /// `created_by` is the authenticated caller; it is recorded in the
    /// operation's trace.
    ///
    /// # Errors
    ///
    /// - `Validation` if a name is out of bounds, capacity is not in `1..=500`,
    ///   or the normalized start time is not strictly after now
    /// - `Storage` if the insert fails
    #[tracing::instrument(skip(self, request), fields(created_by = %created_by))]
    pub async fn create_class(&self, created_by: UserId, request: NewClass) -> Result<ClassRecord> {
        let name = validation::name("Class name", &request.name)?;
        let instructor = validation::name("Instructor", &request.instructor)?;
        let capacity = validation::capacity(request.capacity)?;

        let starts_at = self.clock.normalize(request.starts_at);
        if starts_at <= self.clock.now() {
            return Err(BookingError::Validation(
                "Class dateTime cannot be in the past".to_string(),
            ));
        }

        let stored = StoredClass {
            id: ClassId::new(),
            name,
            instructor,
            starts_at: self.clock.to_storage(starts_at),
            total_capacity: capacity,
            available_capacity: capacity,
        };

        self.store.insert_class(&stored).await.map_err(|e| {
            tracing::error!(error = %e, "Failed to persist class");
            BookingError::from(e)
        })?;

        crate::metrics::record_class_created();
        tracing::info!(class_id = %stored.id, capacity, %starts_at, "Class created");

        Ok(self.to_record(stored))
    }

    /// Classes whose start time is at or after now, soonest first.
    ///
    /// A point-in-time snapshot: a class drops out of this listing as soon as
    /// its start time passes.
    ///
    /// # Errors
    ///
    /// Returns `Storage` if the read fails.
    pub async fn list_upcoming_classes(&self) -> Result<Vec<ClassRecord>> {
        let now = self.clock.now();
        let rows = self
            .store
            .classes_starting_from(self.clock.to_storage(now))
            .await?;

        let mut classes: Vec<ClassRecord> = rows
            .into_iter()
            .map(|row| self.to_record(row))
            .filter(|class| class.starts_at >= now)
            .collect();
        classes.sort_by_key(|class| class.starts_at);

        Ok(classes)
    }

    /// Fetch one class.
    ///
    /// # Errors
    ///
    /// - `NotFound` if no class has this ID
    /// - `Storage` if the read fails
    pub async fn get_class(&self, class_id: ClassId) -> Result<ClassRecord> {
        self.store
            .find_class(class_id)
            .await?
            .map(|row| self.to_record(row))
            .ok_or_else(|| BookingError::class_not_found(class_id))
    }

    fn to_record(&self, row: StoredClass) -> ClassRecord {
        ClassRecord {
            id: row.id,
            name: row.name,
            instructor: row.instructor,
            starts_at: self.clock.normalize(row.starts_at),
            total_capacity: row.total_capacity,
            available_capacity: row.available_capacity,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::clock::CanonicalZone;
    use crate::mocks::{FixedClock, InMemoryBookingStore};
    use chrono::{DateTime, Duration, NaiveDate, TimeZone, Utc};

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 1, 6, 0, 0).unwrap()
    }

    fn setup() -> (ClassCatalog, Arc<FixedClock>, Arc<InMemoryBookingStore>) {
        let clock = Arc::new(FixedClock::new(now()));
        let store = Arc::new(InMemoryBookingStore::new());
        let catalog = ClassCatalog::new(
            store.clone(),
            ScheduleClock::new(clock.clone(), CanonicalZone::ist()),
        );
        (catalog, clock, store)
    }

    #[tokio::test]
    async fn test_create_class_opens_all_seats() {
        let (catalog, _, _) = setup();
        let class = catalog
            .create_class(
                UserId::new(),
                NewClass::new("Yoga Flow", "John Doe", now() + Duration::hours(2), 5),
            )
            .await
            .unwrap();

        assert_eq!(class.total_capacity, 5);
        assert_eq!(class.available_capacity, 5);
        assert_eq!(class.starts_at, now() + Duration::hours(2));
        assert_eq!(class.starts_at.offset().local_minus_utc(), 19_800);
    }

    #[tokio::test]
    async fn test_create_class_rejects_non_positive_capacity() {
        let (catalog, _, _) = setup();
        for capacity in [0, -1] {
            let err = catalog
                .create_class(
                    UserId::new(),
                    NewClass::new("Yoga Flow", "John Doe", now() + Duration::hours(2), capacity),
                )
                .await
                .unwrap_err();
            assert!(matches!(err, BookingError::Validation(_)));
        }
    }

    #[tokio::test]
    async fn test_create_class_requires_strictly_future_start() {
        let (catalog, _, store) = setup();
        for starts_at in [now(), now() - Duration::minutes(1)] {
            let err = catalog
                .create_class(UserId::new(), NewClass::new("Spin", "Coach", starts_at, 5))
                .await
                .unwrap_err();
            assert!(matches!(err, BookingError::Validation(_)));
        }
        assert_eq!(store.class_count(), 0);
    }

    #[tokio::test]
    async fn test_create_class_at_calendar_limit_is_rejected() {
        let (catalog, _, store) = setup();
        let err = catalog
            .create_class(
                UserId::new(),
                NewClass::new("Spin", "Coach", chrono::NaiveDateTime::MIN, 5),
            )
            .await
            .unwrap_err();
        assert!(matches!(err, BookingError::Validation(_)));
        assert_eq!(store.class_count(), 0);
    }

    #[tokio::test]
    async fn test_naive_start_time_is_canonical_wall_time() {
        let (catalog, _, _) = setup();
        // now() is 11:30 IST; 11:00 naive is in the past in IST even though
        // 11:00 UTC would be in the future.
        let eleven = NaiveDate::from_ymd_opt(2026, 3, 1)
            .unwrap()
            .and_hms_opt(11, 0, 0)
            .unwrap();
        let err = catalog
            .create_class(UserId::new(), NewClass::new("Spin", "Coach", eleven, 5))
            .await
            .unwrap_err();
        assert!(matches!(err, BookingError::Validation(_)));

        let noon = eleven + Duration::hours(1);
        let class = catalog
            .create_class(UserId::new(), NewClass::new("Spin", "Coach", noon, 5))
            .await
            .unwrap();
        assert_eq!(class.starts_at.naive_local(), noon);
    }

    #[tokio::test]
    async fn test_list_upcoming_is_sorted_and_drops_elapsed() {
        let (catalog, clock, _) = setup();
        let user = UserId::new();
        let late = catalog
            .create_class(user, NewClass::new("Late", "Coach", now() + Duration::hours(5), 3))
            .await
            .unwrap();
        let early = catalog
            .create_class(user, NewClass::new("Early", "Coach", now() + Duration::hours(1), 3))
            .await
            .unwrap();

        let listed: Vec<ClassId> = catalog
            .list_upcoming_classes()
            .await
            .unwrap()
            .into_iter()
            .map(|c| c.id)
            .collect();
        assert_eq!(listed, vec![early.id, late.id]);

        // Exactly at start time the class is still listed (>= now)
        clock.set(now() + Duration::hours(1));
        assert_eq!(catalog.list_upcoming_classes().await.unwrap().len(), 2);

        clock.set(now() + Duration::hours(1) + Duration::seconds(1));
        let listed = catalog.list_upcoming_classes().await.unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].id, late.id);
    }

    #[tokio::test]
    async fn test_get_class_not_found() {
        let (catalog, _, _) = setup();
        let err = catalog.get_class(ClassId::new()).await.unwrap_err();
        assert!(matches!(err, BookingError::NotFound { .. }));
    }
}
