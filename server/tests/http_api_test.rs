//! HTTP API tests.
//!
//! Drives the full router over in-memory stores and a fixed clock, so the
//! whole request path (correlation layer, bearer extractor, handlers,
//! catalog/ledger, error mapping) runs without a database.

#![allow(clippy::unwrap_used, clippy::expect_used)] // Test code can use unwrap/expect
#![allow(clippy::too_many_lines)]

use axum::http::{HeaderName, HeaderValue, StatusCode, header};
use axum_test::{TestResponse, TestServer};
use chrono::{DateTime, Duration, TimeZone, Utc};
use fitbook::{assemble_state, build_router};
use fitbook_auth::mocks::{MockSessionStore, MockUserRepository};
use fitbook_core::CanonicalZone;
use fitbook_core::mocks::{FixedClock, InMemoryBookingStore};
use serde_json::{Value, json};
use std::sync::Arc;

/// 2026-02-10 05:30 IST.
fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 2, 10, 0, 0, 0).unwrap()
}

struct Harness {
    server: TestServer,
    clock: Arc<FixedClock>,
    store: Arc<InMemoryBookingStore>,
}

fn harness() -> Harness {
    let clock = Arc::new(FixedClock::new(now()));
    let store = Arc::new(InMemoryBookingStore::new());
    let state = assemble_state(
        store.clone(),
        Arc::new(MockUserRepository::new()),
        Arc::new(MockSessionStore::new()),
        clock.clone(),
        CanonicalZone::ist(),
        Duration::hours(24),
    );
    let server = TestServer::new(build_router(state)).expect("Failed to start test server");
    Harness {
        server,
        clock,
        store,
    }
}

fn bearer(token: &str) -> HeaderValue {
    HeaderValue::from_str(&format!("Bearer {token}")).unwrap()
}

fn error_code(response: &TestResponse) -> String {
    response.json::<Value>()["code"].as_str().unwrap().to_string()
}

async fn signup_and_login(h: &Harness, name: &str, email: &str) -> String {
    h.server
        .post("/signup")
        .json(&json!({"name": name, "email": email, "password": "test1234"}))
        .await
        .assert_status(StatusCode::CREATED);

    let response = h
        .server
        .post("/login-json")
        .json(&json!({"email": email, "password": "test1234"}))
        .await;
    response.assert_status_ok();
    response.json::<Value>()["access_token"]
        .as_str()
        .unwrap()
        .to_string()
}

async fn create_class(h: &Harness, token: &str, date_time: &str, slots: i64) -> TestResponse {
    h.server
        .post("/classes")
        .add_header(header::AUTHORIZATION, bearer(token))
        .json(&json!({
            "name": "HIIT Session",
            "dateTime": date_time,
            "instructor": "Coach",
            "availableSlots": slots,
        }))
        .await
}

async fn book(h: &Harness, token: &str, class_id: &str, name: &str, email: &str) -> TestResponse {
    h.server
        .post("/book")
        .add_header(header::AUTHORIZATION, bearer(token))
        .json(&json!({
            "class_id": class_id,
            "client_name": name,
            "client_email": email,
        }))
        .await
}

#[tokio::test]
async fn test_health_and_readiness() {
    let h = harness();

    for path in ["/", "/health"] {
        let response = h.server.get(path).await;
        response.assert_status_ok();
        assert_eq!(response.json::<Value>()["status"], "ok");
    }

    let response = h.server.get("/ready").await;
    response.assert_status_ok();
    assert_eq!(response.json::<Value>()["ready"], true);
}

#[tokio::test]
async fn test_readiness_reports_unreachable_store() {
    let h = harness();
    h.store.set_unreachable(true);

    let response = h.server.get("/ready").await;
    response.assert_status(StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(error_code(&response), "SERVICE_UNAVAILABLE");

    // Liveness does not depend on the store
    h.server.get("/health").await.assert_status_ok();

    h.store.set_unreachable(false);
    h.server.get("/ready").await.assert_status_ok();
}

#[tokio::test]
async fn test_correlation_id_echoed() {
    let h = harness();
    let id = "6f1c2f2e-8d0e-4a7b-9a51-0b2d1f3c4e5a";

    let response = h
        .server
        .get("/health")
        .add_header(
            HeaderName::from_static("x-correlation-id"),
            HeaderValue::from_static(id),
        )
        .await;
    assert_eq!(response.headers().get("x-correlation-id").unwrap(), id);

    let response = h.server.get("/classes/not-a-class").await;
    response.assert_status(StatusCode::NOT_FOUND);
    assert!(response.headers().contains_key("x-correlation-id"));
}

#[tokio::test]
async fn test_signup_and_both_logins() {
    let h = harness();
    let token = signup_and_login(&h, "Test User", "Test@Example.com").await;
    assert_eq!(token.len(), 43);

    let response = h
        .server
        .post("/login")
        .form(&[
            ("grant_type", "password"),
            ("username", "test@example.com"),
            ("password", "test1234"),
        ])
        .await;
    response.assert_status_ok();
    let body = response.json::<Value>();
    assert_eq!(body["token_type"], "bearer");
    assert_ne!(body["access_token"].as_str().unwrap(), token);
}

#[tokio::test]
async fn test_duplicate_signup_conflicts() {
    let h = harness();
    signup_and_login(&h, "Test User", "dup@example.com").await;

    let response = h
        .server
        .post("/signup")
        .json(&json!({"name": "Other", "email": "DUP@example.com", "password": "another1"}))
        .await;
    response.assert_status(StatusCode::CONFLICT);
    assert_eq!(error_code(&response), "EMAIL_ALREADY_REGISTERED");
}

#[tokio::test]
async fn test_bad_credentials_are_indistinguishable() {
    let h = harness();
    signup_and_login(&h, "Test User", "known@example.com").await;

    let wrong_password = h
        .server
        .post("/login-json")
        .json(&json!({"email": "known@example.com", "password": "wrong-pass"}))
        .await;
    let unknown_email = h
        .server
        .post("/login-json")
        .json(&json!({"email": "nobody@example.com", "password": "test1234"}))
        .await;

    wrong_password.assert_status(StatusCode::UNAUTHORIZED);
    unknown_email.assert_status(StatusCode::UNAUTHORIZED);
    assert_eq!(wrong_password.text(), unknown_email.text());
}

#[tokio::test]
async fn test_protected_routes_require_auth() {
    let h = harness();
    let class = json!({
        "name": "Yoga Flow",
        "dateTime": "2026-02-10T10:00:00Z",
        "instructor": "John Doe",
        "availableSlots": 5,
    });

    let response = h.server.post("/classes").json(&class).await;
    response.assert_status(StatusCode::UNAUTHORIZED);

    let response = h
        .server
        .post("/classes")
        .add_header(header::AUTHORIZATION, bearer("forged-token"))
        .json(&class)
        .await;
    response.assert_status(StatusCode::UNAUTHORIZED);

    h.server
        .get("/bookings")
        .await
        .assert_status(StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_expired_session_rejected() {
    let h = harness();
    let token = signup_and_login(&h, "Test User", "expiry@example.com").await;

    h.server
        .get("/bookings")
        .add_header(header::AUTHORIZATION, bearer(&token))
        .await
        .assert_status_ok();

    h.clock.advance(Duration::hours(24));
    h.server
        .get("/bookings")
        .add_header(header::AUTHORIZATION, bearer(&token))
        .await
        .assert_status(StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_hiit_session_booking_flow() {
    let h = harness();
    let alice = signup_and_login(&h, "Alice", "alice@example.com").await;
    let bob = signup_and_login(&h, "Bob", "bob@example.com").await;
    let carol = signup_and_login(&h, "Carol", "carol@example.com").await;

    let response = create_class(&h, &alice, "2026-02-10T18:30:00", 2).await;
    response.assert_status(StatusCode::CREATED);
    let class = response.json::<Value>();
    assert_eq!(class["availableSlots"], 2);
    assert_eq!(class["dateTime"], "2026-02-10T18:30:00+05:30");
    let class_id = class["id"].as_str().unwrap().to_string();

    let response = book(&h, &alice, &class_id, "Alice", "alice@example.com").await;
    response.assert_status(StatusCode::CREATED);
    let body = response.json::<Value>();
    assert_eq!(body["message"], "Booking successful");
    assert_eq!(body["remaining_slots"], 1);

    let response = book(&h, &alice, &class_id, "Alice", "alice@example.com").await;
    response.assert_status(StatusCode::CONFLICT);
    assert_eq!(error_code(&response), "DUPLICATE_BOOKING");

    let response = book(&h, &bob, &class_id, "Bob", "bob@example.com").await;
    response.assert_status(StatusCode::CREATED);
    assert_eq!(response.json::<Value>()["remaining_slots"], 0);

    let response = book(&h, &carol, &class_id, "Carol", "carol@example.com").await;
    response.assert_status(StatusCode::BAD_REQUEST);
    assert_eq!(error_code(&response), "CAPACITY_EXHAUSTED");

    let response = h.server.get(&format!("/classes/{class_id}")).await;
    response.assert_status_ok();
    assert_eq!(response.json::<Value>()["availableSlots"], 0);
}

#[tokio::test]
async fn test_started_class_cannot_be_booked() {
    let h = harness();
    let token = signup_and_login(&h, "Test User", "late@example.com").await;

    let response = create_class(&h, &token, "2026-02-10T07:00:00+05:30", 5).await;
    response.assert_status(StatusCode::CREATED);
    let class_id = response.json::<Value>()["id"].as_str().unwrap().to_string();

    h.clock.advance(Duration::hours(2));

    let response = book(&h, &token, &class_id, "Test User", "late@example.com").await;
    response.assert_status(StatusCode::BAD_REQUEST);
    assert_eq!(error_code(&response), "CLASS_ALREADY_STARTED");

    let listed = h.server.get("/classes").await.json::<Vec<Value>>();
    assert!(listed.is_empty());
}

#[tokio::test]
async fn test_create_class_validation() {
    let h = harness();
    let token = signup_and_login(&h, "Test User", "coach@example.com").await;

    for slots in [0, -3, 501] {
        let response = create_class(&h, &token, "2026-02-11T10:00:00", slots).await;
        response.assert_status(StatusCode::BAD_REQUEST);
        assert_eq!(error_code(&response), "VALIDATION_ERROR");
    }

    // 05:00 IST has already passed
    let response = create_class(&h, &token, "2026-02-10T05:00:00", 5).await;
    response.assert_status(StatusCode::BAD_REQUEST);

    let response = create_class(&h, &token, "next tuesday", 5).await;
    response.assert_status(StatusCode::BAD_REQUEST);
    assert_eq!(error_code(&response), "VALIDATION_ERROR");

    for extreme in ["-262143-01-01T00:00:00", "+262142-12-31T23:59:59"] {
        let response = create_class(&h, &token, extreme, 5).await;
        response.assert_status(StatusCode::BAD_REQUEST);
        assert_eq!(error_code(&response), "VALIDATION_ERROR");
    }

    let response = h
        .server
        .post("/classes")
        .add_header(header::AUTHORIZATION, bearer(&token))
        .json(&json!({"name": "Spin"}))
        .await;
    response.assert_status(StatusCode::BAD_REQUEST);

    assert!(h.server.get("/classes").await.json::<Vec<Value>>().is_empty());
}

#[tokio::test]
async fn test_booking_unknown_class_is_not_found() {
    let h = harness();
    let token = signup_and_login(&h, "Test User", "lost@example.com").await;

    let response = book(
        &h,
        &token,
        "00000000-0000-4000-8000-000000000000",
        "Test User",
        "lost@example.com",
    )
    .await;
    response.assert_status(StatusCode::NOT_FOUND);
    assert_eq!(error_code(&response), "NOT_FOUND");
}

#[tokio::test]
async fn test_listings_are_ordered() {
    let h = harness();
    let token = signup_and_login(&h, "Test User", "order@example.com").await;

    let later = create_class(&h, &token, "2026-02-12T09:00:00", 5)
        .await
        .json::<Value>();
    let sooner = create_class(&h, &token, "2026-02-11T09:00:00", 5)
        .await
        .json::<Value>();

    let listed = h.server.get("/classes").await.json::<Vec<Value>>();
    let ids: Vec<&Value> = listed.iter().map(|c| &c["id"]).collect();
    assert_eq!(ids, vec![&sooner["id"], &later["id"]]);

    book(&h, &token, later["id"].as_str().unwrap(), "Test User", "order@example.com")
        .await
        .assert_status(StatusCode::CREATED);
    h.clock.advance(Duration::minutes(5));
    book(&h, &token, sooner["id"].as_str().unwrap(), "Test User", "order@example.com")
        .await
        .assert_status(StatusCode::CREATED);

    let bookings = h
        .server
        .get("/bookings")
        .add_header(header::AUTHORIZATION, bearer(&token))
        .await
        .json::<Vec<Value>>();
    assert_eq!(bookings.len(), 2);
    assert_eq!(bookings[0]["class_id"], sooner["id"]);
    assert_eq!(bookings[1]["class_id"], later["id"]);
    assert_eq!(bookings[0]["class_name"], "HIIT Session");
    assert_eq!(bookings[0]["dateTime"], "2026-02-11T09:00:00+05:30");
    assert_eq!(bookings[0]["client_email"], "order@example.com");
}
