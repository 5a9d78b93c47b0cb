//! Concurrency stress tests for the booking ledger.
//!
//! Many tasks race to reserve seats on the same class. Whatever the
//! interleaving, successes never exceed capacity and the committed seat count
//! always balances against the class's available capacity.
//!
//! Run with: `cargo test --test ledger_concurrency_test -- --nocapture`

#![allow(clippy::expect_used, clippy::unwrap_used)] // Test code can use unwrap/expect

use chrono::{DateTime, Duration, TimeZone, Utc};
use fitbook_core::{
    BookingError, BookingLedger, CanonicalZone, ClassCatalog, ClassId, Contact, NewClass,
    ScheduleClock, UserId,
    mocks::{FixedClock, InMemoryBookingStore},
};
use proptest::prelude::*;
use std::sync::Arc;

fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 6, 1, 3, 30, 0).unwrap()
}

struct Harness {
    catalog: ClassCatalog,
    ledger: Arc<BookingLedger>,
    store: Arc<InMemoryBookingStore>,
}

fn harness() -> Harness {
    let store = Arc::new(InMemoryBookingStore::new());
    let clock = ScheduleClock::new(Arc::new(FixedClock::new(now())), CanonicalZone::ist());
    Harness {
        catalog: ClassCatalog::new(store.clone(), clock.clone()),
        ledger: Arc::new(BookingLedger::new(store.clone(), clock)),
        store,
    }
}

async fn create_class(h: &Harness, capacity: i64) -> ClassId {
    h.catalog
        .create_class(
            UserId::new(),
            NewClass::new("Spin Class", "Coach", now() + Duration::hours(3), capacity),
        )
        .await
        .expect("class creation")
        .id
}

async fn race(
    ledger: &Arc<BookingLedger>,
    class_id: ClassId,
    users: Vec<UserId>,
) -> Vec<Result<u32, BookingError>> {
    let handles: Vec<_> = users
        .into_iter()
        .enumerate()
        .map(|(i, user)| {
            let ledger = Arc::clone(ledger);
            tokio::spawn(async move {
                ledger
                    .reserve(user, class_id, Contact::new(format!("Rider {i}"), format!("rider{i}@example.com")))
                    .await
                    .map(|r| r.remaining_capacity)
            })
        })
        .collect();

    futures::future::join_all(handles)
        .await
        .into_iter()
        .map(|r| r.expect("Task panicked"))
        .collect()
}

/// 100 distinct users race for 10 seats.
#[tokio::test(flavor = "multi_thread", worker_threads = 8)]
async fn test_oversubscribed_class_never_overbooks() {
    println!("🧪 Concurrency Stress Test: 100 concurrent requests for 10 seats");

    let h = harness();
    let class_id = create_class(&h, 10).await;

    let users = (0..100).map(|_| UserId::new()).collect();
    let results = race(&h.ledger, class_id, users).await;

    let successes = results.iter().filter(|r| r.is_ok()).count();
    let exhausted = results
        .iter()
        .filter(|r| matches!(r, Err(BookingError::CapacityExhausted)))
        .count();

    println!("  ✅ Successes: {successes}");
    println!("  ❌ Exhausted: {exhausted}");

    assert_eq!(successes, 10, "exactly capacity many reservations succeed");
    assert_eq!(exhausted, 90, "every other attempt sees CapacityExhausted");
    assert_eq!(h.store.bookings_for_class(class_id), 10);

    let class = h.catalog.get_class(class_id).await.unwrap();
    assert_eq!(class.available_capacity, 0);

    // Each remaining count 0..=9 is reported exactly once
    let mut remaining: Vec<u32> = results.into_iter().filter_map(Result::ok).collect();
    remaining.sort_unstable();
    assert_eq!(remaining, (0..10).collect::<Vec<_>>());
}

/// Two users race for the last seat.
#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_last_seat_goes_to_exactly_one_user() {
    let h = harness();
    let class_id = create_class(&h, 1).await;

    let results = race(&h.ledger, class_id, vec![UserId::new(), UserId::new()]).await;

    assert_eq!(results.iter().filter(|r| r.is_ok()).count(), 1);
    assert!(
        results
            .iter()
            .any(|r| matches!(r, Err(BookingError::CapacityExhausted)))
    );
    assert_eq!(h.catalog.get_class(class_id).await.unwrap().available_capacity, 0);
}

/// One user fires the same booking many times at once.
#[tokio::test(flavor = "multi_thread", worker_threads = 8)]
async fn test_same_user_concurrent_duplicates() {
    let h = harness();
    let class_id = create_class(&h, 5).await;
    let user = UserId::new();

    let results = race(&h.ledger, class_id, vec![user; 20]).await;

    assert_eq!(results.iter().filter(|r| r.is_ok()).count(), 1);
    assert_eq!(
        results
            .iter()
            .filter(|r| matches!(r, Err(BookingError::DuplicateBooking)))
            .count(),
        19
    );
    assert_eq!(h.catalog.get_class(class_id).await.unwrap().available_capacity, 4);
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    /// Seats sold plus seats left always equals capacity.
    #[test]
    fn prop_capacity_balances(capacity in 1i64..20, attempts in 0usize..40) {
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(4)
            .enable_all()
            .build()
            .unwrap();

        let (successes, available, expected) = runtime.block_on(async {
            let h = harness();
            let class_id = create_class(&h, capacity).await;
            let users = (0..attempts).map(|_| UserId::new()).collect();
            let results = race(&h.ledger, class_id, users).await;

            let successes = results.iter().filter(|r| r.is_ok()).count();
            let available = h.catalog.get_class(class_id).await.unwrap().available_capacity;
            (successes, available, usize::try_from(capacity).unwrap())
        });

        prop_assert_eq!(successes, attempts.min(expected));
        prop_assert_eq!(successes + available as usize, expected);
    }
}
