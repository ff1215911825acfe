//! API integration tests
//!
//! These tests require a running server with a clean database:
//! `cargo run`, then `cargo test -- --ignored`.

use chrono::{Duration, Utc};
use reqwest::Client;
use serde_json::{json, Value};

const BASE_URL: &str = "http://localhost:8080";
const USER_HEADER: &str = "X-Sharer-User-Id";

/// Create a user with a unique email and return its id
async fn create_user(client: &Client, name: &str) -> i32 {
    let nanos = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap()
        .as_nanos();
    let response = client
        .post(format!("{}/users", BASE_URL))
        .json(&json!({
            "name": name,
            "email": format!("{}+{}@example.com", name.to_lowercase(), nanos)
        }))
        .send()
        .await
        .expect("Failed to create user");

    assert_eq!(response.status(), 201);
    let body: Value = response.json().await.expect("Failed to parse user");
    body["id"].as_i64().expect("No user ID") as i32
}

/// Create an available item owned by `owner_id` and return its id
async fn create_item(client: &Client, owner_id: i32, name: &str, available: bool) -> i32 {
    let response = client
        .post(format!("{}/items", BASE_URL))
        .header(USER_HEADER, owner_id)
        .json(&json!({
            "name": name,
            "description": format!("{} for lending", name),
            "available": available
        }))
        .send()
        .await
        .expect("Failed to create item");

    assert_eq!(response.status(), 201);
    let body: Value = response.json().await.expect("Failed to parse item");
    body["id"].as_i64().expect("No item ID") as i32
}

/// Book an item and return the response
async fn book_item(
    client: &Client,
    booker_id: i32,
    item_id: i32,
    start_offset: Duration,
    end_offset: Duration,
) -> reqwest::Response {
    let now = Utc::now();
    client
        .post(format!("{}/bookings", BASE_URL))
        .header(USER_HEADER, booker_id)
        .json(&json!({
            "start_date": now + start_offset,
            "end_date": now + end_offset,
            "item_id": item_id
        }))
        .send()
        .await
        .expect("Failed to send booking request")
}

#[tokio::test]
#[ignore] // Run with: cargo test -- --ignored
async fn test_health_check() {
    let client = Client::new();

    let response = client
        .get(format!("{}/health", BASE_URL))
        .send()
        .await
        .expect("Failed to send request");

    assert!(response.status().is_success());

    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["status"], "healthy");
}

#[tokio::test]
#[ignore]
async fn test_create_and_get_user() {
    let client = Client::new();
    let user_id = create_user(&client, "Greta").await;

    let response = client
        .get(format!("{}/users/{}", BASE_URL, user_id))
        .send()
        .await
        .expect("Failed to send request");

    assert!(response.status().is_success());
    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["name"], "Greta");
}

#[tokio::test]
#[ignore]
async fn test_duplicate_email_is_conflict() {
    let client = Client::new();

    let response = client
        .post(format!("{}/users", BASE_URL))
        .json(&json!({"name": "First", "email": "taken@example.com"}))
        .send()
        .await
        .expect("Failed to send request");
    // First insertion may already exist from a previous run
    assert!(response.status() == 201 || response.status() == 409);

    let response = client
        .post(format!("{}/users", BASE_URL))
        .json(&json!({"name": "Second", "email": "TAKEN@example.com"}))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), 409);
}

#[tokio::test]
#[ignore]
async fn test_missing_sharer_header_is_rejected() {
    let client = Client::new();

    let response = client
        .get(format!("{}/items", BASE_URL))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), 400);
}

#[tokio::test]
#[ignore]
async fn test_booking_lifecycle() {
    let client = Client::new();
    let owner_id = create_user(&client, "Owner").await;
    let booker_id = create_user(&client, "Booker").await;
    let item_id = create_item(&client, owner_id, "Ladder", true).await;

    // Book for [T+1h, T+2h]
    let response = book_item(&client, booker_id, item_id, Duration::hours(1), Duration::hours(2)).await;
    assert_eq!(response.status(), 201);
    let body: Value = response.json().await.expect("Failed to parse booking");
    assert_eq!(body["status"], "WAITING");
    assert_eq!(body["booker"]["id"].as_i64().unwrap() as i32, booker_id);
    assert_eq!(body["item"]["id"].as_i64().unwrap() as i32, item_id);
    let booking_id = body["id"].as_i64().unwrap();

    // Owner approves
    let response = client
        .patch(format!("{}/bookings/{}?approved=true", BASE_URL, booking_id))
        .header(USER_HEADER, owner_id)
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 200);
    let body: Value = response.json().await.expect("Failed to parse booking");
    assert_eq!(body["status"], "APPROVED");

    // The decision is terminal; a second one fails
    let response = client
        .patch(format!("{}/bookings/{}?approved=false", BASE_URL, booking_id))
        .header(USER_HEADER, owner_id)
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 400);

    let response = client
        .get(format!("{}/bookings/{}", BASE_URL, booking_id))
        .header(USER_HEADER, booker_id)
        .send()
        .await
        .expect("Failed to send request");
    let body: Value = response.json().await.expect("Failed to parse booking");
    assert_eq!(body["status"], "APPROVED");
}

#[tokio::test]
#[ignore]
async fn test_booking_rejection() {
    let client = Client::new();
    let owner_id = create_user(&client, "Owner").await;
    let booker_id = create_user(&client, "Booker").await;
    let item_id = create_item(&client, owner_id, "Drill", true).await;

    let response = book_item(&client, booker_id, item_id, Duration::hours(1), Duration::hours(2)).await;
    let body: Value = response.json().await.expect("Failed to parse booking");
    let booking_id = body["id"].as_i64().unwrap();

    let response = client
        .patch(format!("{}/bookings/{}?approved=false", BASE_URL, booking_id))
        .header(USER_HEADER, owner_id)
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 200);
    let body: Value = response.json().await.expect("Failed to parse booking");
    assert_eq!(body["status"], "REJECTED");
}

#[tokio::test]
#[ignore]
async fn test_booking_with_past_start_is_rejected() {
    let client = Client::new();
    let owner_id = create_user(&client, "Owner").await;
    let booker_id = create_user(&client, "Booker").await;
    let item_id = create_item(&client, owner_id, "Tent", true).await;

    let response = book_item(&client, booker_id, item_id, -Duration::hours(1), Duration::hours(1)).await;
    assert_eq!(response.status(), 400);
}

#[tokio::test]
#[ignore]
async fn test_booking_with_inverted_window_is_rejected() {
    let client = Client::new();
    let owner_id = create_user(&client, "Owner").await;
    let booker_id = create_user(&client, "Booker").await;
    let item_id = create_item(&client, owner_id, "Canoe", true).await;

    let response = book_item(&client, booker_id, item_id, Duration::hours(2), Duration::hours(1)).await;
    assert_eq!(response.status(), 400);
}

#[tokio::test]
#[ignore]
async fn test_owner_cannot_book_own_item() {
    let client = Client::new();
    let owner_id = create_user(&client, "Owner").await;
    let item_id = create_item(&client, owner_id, "Mower", true).await;

    // Reported as not-found, not as a permission problem
    let response = book_item(&client, owner_id, item_id, Duration::hours(1), Duration::hours(2)).await;
    assert_eq!(response.status(), 404);
}

#[tokio::test]
#[ignore]
async fn test_unavailable_item_cannot_be_booked() {
    let client = Client::new();
    let owner_id = create_user(&client, "Owner").await;
    let booker_id = create_user(&client, "Booker").await;
    let item_id = create_item(&client, owner_id, "Projector", false).await;

    let response = book_item(&client, booker_id, item_id, Duration::hours(1), Duration::hours(2)).await;
    assert_eq!(response.status(), 400);
}

#[tokio::test]
#[ignore]
async fn test_booking_invisible_to_non_participants() {
    let client = Client::new();
    let owner_id = create_user(&client, "Owner").await;
    let booker_id = create_user(&client, "Booker").await;
    let outsider_id = create_user(&client, "Outsider").await;
    let item_id = create_item(&client, owner_id, "Bike", true).await;

    let response = book_item(&client, booker_id, item_id, Duration::hours(1), Duration::hours(2)).await;
    let body: Value = response.json().await.expect("Failed to parse booking");
    let booking_id = body["id"].as_i64().unwrap();

    // A non-participant and an unknown id get the same answer
    let response = client
        .get(format!("{}/bookings/{}", BASE_URL, booking_id))
        .header(USER_HEADER, outsider_id)
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 404);

    let response = client
        .get(format!("{}/bookings/{}", BASE_URL, 999_999_999))
        .header(USER_HEADER, outsider_id)
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 404);

    // Approval by a non-owner is hidden the same way
    let response = client
        .patch(format!("{}/bookings/{}?approved=true", BASE_URL, booking_id))
        .header(USER_HEADER, booker_id)
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 404);
}

#[tokio::test]
#[ignore]
async fn test_booker_listing_states() {
    let client = Client::new();
    let owner_id = create_user(&client, "Owner").await;
    let booker_id = create_user(&client, "Booker").await;
    let item_id = create_item(&client, owner_id, "Kayak", true).await;

    let response = book_item(&client, booker_id, item_id, Duration::hours(1), Duration::hours(2)).await;
    let body: Value = response.json().await.expect("Failed to parse booking");
    let booking_id = body["id"].as_i64().unwrap();

    for (state, expected) in [
        ("ALL", true),
        ("FUTURE", true),
        ("WAITING", true),
        ("PAST", false),
        ("CURRENT", false),
        ("REJECTED", false),
    ] {
        let response = client
            .get(format!("{}/bookings?state={}&from=0&size=50", BASE_URL, state))
            .header(USER_HEADER, booker_id)
            .send()
            .await
            .expect("Failed to send request");
        assert_eq!(response.status(), 200);
        let body: Value = response.json().await.expect("Failed to parse response");
        let found = body
            .as_array()
            .unwrap()
            .iter()
            .any(|b| b["id"].as_i64() == Some(booking_id));
        assert_eq!(found, expected, "state {}", state);
    }

    // The owner-side listing sees the same booking
    let response = client
        .get(format!("{}/bookings/owner?state=FUTURE&from=0&size=50", BASE_URL))
        .header(USER_HEADER, owner_id)
        .send()
        .await
        .expect("Failed to send request");
    let body: Value = response.json().await.expect("Failed to parse response");
    assert!(body
        .as_array()
        .unwrap()
        .iter()
        .any(|b| b["id"].as_i64() == Some(booking_id)));
}

// A short-lived booking crosses FUTURE -> CURRENT -> PAST as the clock
// passes its window; the buckets are computed on read, never stored.
#[tokio::test]
#[ignore]
async fn test_booking_moves_through_time_buckets() {
    let client = Client::new();
    let owner_id = create_user(&client, "Owner").await;
    let booker_id = create_user(&client, "Booker").await;
    let item_id = create_item(&client, owner_id, "Lantern", true).await;

    let response = book_item(&client, booker_id, item_id, Duration::seconds(2), Duration::seconds(4)).await;
    assert_eq!(response.status(), 201);
    let body: Value = response.json().await.expect("Failed to parse booking");
    let booking_id = body["id"].as_i64().unwrap();

    let in_bucket = |state: &'static str| {
        let client = client.clone();
        async move {
            let body: Value = client
                .get(format!("{}/bookings?state={}&from=0&size=50", BASE_URL, state))
                .header(USER_HEADER, booker_id)
                .send()
                .await
                .expect("Failed to send request")
                .json()
                .await
                .expect("Failed to parse response");
            body.as_array()
                .unwrap()
                .iter()
                .any(|b| b["id"].as_i64() == Some(booking_id))
        }
    };

    assert!(in_bucket("FUTURE").await);
    assert!(!in_bucket("CURRENT").await);

    tokio::time::sleep(std::time::Duration::from_secs(3)).await;
    assert!(in_bucket("CURRENT").await);
    assert!(!in_bucket("FUTURE").await);
    assert!(!in_bucket("PAST").await);

    tokio::time::sleep(std::time::Duration::from_secs(2)).await;
    assert!(in_bucket("PAST").await);
    assert!(!in_bucket("CURRENT").await);
}

#[tokio::test]
#[ignore]
async fn test_unknown_state_is_rejected() {
    let client = Client::new();
    let booker_id = create_user(&client, "Booker").await;

    let response = client
        .get(format!("{}/bookings?state=SOMEDAY&from=0&size=10", BASE_URL))
        .header(USER_HEADER, booker_id)
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 400);
}

#[tokio::test]
#[ignore]
async fn test_offset_rounds_down_to_page() {
    let client = Client::new();
    let owner_id = create_user(&client, "Owner").await;
    let booker_id = create_user(&client, "Booker").await;
    let item_id = create_item(&client, owner_id, "Speaker", true).await;

    for hour in 1..=3 {
        let response = book_item(
            &client,
            booker_id,
            item_id,
            Duration::hours(hour),
            Duration::hours(hour + 1),
        )
        .await;
        assert_eq!(response.status(), 201);
    }

    // from=5 with size=10 lands on page 0, same as from=0
    let aligned: Value = client
        .get(format!("{}/bookings?state=ALL&from=0&size=10", BASE_URL))
        .header(USER_HEADER, booker_id)
        .send()
        .await
        .expect("Failed to send request")
        .json()
        .await
        .expect("Failed to parse response");
    let unaligned: Value = client
        .get(format!("{}/bookings?state=ALL&from=5&size=10", BASE_URL))
        .header(USER_HEADER, booker_id)
        .send()
        .await
        .expect("Failed to send request")
        .json()
        .await
        .expect("Failed to parse response");
    assert_eq!(aligned, unaligned);
}

// Nothing prevents two approved bookings with overlapping windows on the
// same item; this pins the permissive behavior so a change to it is
// noticed.
#[tokio::test]
#[ignore]
async fn test_overlapping_approved_bookings_are_permitted() {
    let client = Client::new();
    let owner_id = create_user(&client, "Owner").await;
    let first_booker = create_user(&client, "First").await;
    let second_booker = create_user(&client, "Second").await;
    let item_id = create_item(&client, owner_id, "Trailer", true).await;

    let mut booking_ids = Vec::new();
    for booker in [first_booker, second_booker] {
        let response = book_item(&client, booker, item_id, Duration::hours(1), Duration::hours(3)).await;
        assert_eq!(response.status(), 201);
        let body: Value = response.json().await.expect("Failed to parse booking");
        booking_ids.push(body["id"].as_i64().unwrap());
    }

    for booking_id in booking_ids {
        let response = client
            .patch(format!("{}/bookings/{}?approved=true", BASE_URL, booking_id))
            .header(USER_HEADER, owner_id)
            .send()
            .await
            .expect("Failed to send request");
        assert_eq!(response.status(), 200);
    }
}

#[tokio::test]
#[ignore]
async fn test_comment_requires_completed_booking() {
    let client = Client::new();
    let owner_id = create_user(&client, "Owner").await;
    let booker_id = create_user(&client, "Booker").await;
    let item_id = create_item(&client, owner_id, "Sander", true).await;

    // No booking at all: rejected
    let response = client
        .post(format!("{}/items/{}/comment", BASE_URL, item_id))
        .header(USER_HEADER, booker_id)
        .json(&json!({"text": "Great tool"}))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 400);

    // A booking still in the future does not qualify either
    let response = book_item(&client, booker_id, item_id, Duration::hours(1), Duration::hours(2)).await;
    assert_eq!(response.status(), 201);

    let response = client
        .post(format!("{}/items/{}/comment", BASE_URL, item_id))
        .header(USER_HEADER, booker_id)
        .json(&json!({"text": "Great tool"}))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 400);
}

#[tokio::test]
#[ignore]
async fn test_search_items() {
    let client = Client::new();
    let owner_id = create_user(&client, "Owner").await;
    create_item(&client, owner_id, "Telescope", true).await;
    create_item(&client, owner_id, "Microscope", false).await;

    // Blank text returns nothing
    let response = client
        .get(format!("{}/items/search?text=", BASE_URL))
        .header(USER_HEADER, owner_id)
        .send()
        .await
        .expect("Failed to send request");
    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body.as_array().unwrap().len(), 0);

    // Case-insensitive match, available items only
    let response = client
        .get(format!("{}/items/search?text=scope", BASE_URL))
        .header(USER_HEADER, owner_id)
        .send()
        .await
        .expect("Failed to send request");
    let body: Value = response.json().await.expect("Failed to parse response");
    let names: Vec<&str> = body
        .as_array()
        .unwrap()
        .iter()
        .map(|item| item["name"].as_str().unwrap())
        .collect();
    assert!(names.contains(&"Telescope"));
    assert!(!names.contains(&"Microscope"));
}

#[tokio::test]
#[ignore]
async fn test_item_requests_flow() {
    let client = Client::new();
    let requester_id = create_user(&client, "Requester").await;
    let owner_id = create_user(&client, "Owner").await;

    // Post a request
    let response = client
        .post(format!("{}/requests", BASE_URL))
        .header(USER_HEADER, requester_id)
        .json(&json!({"description": "Looking for a pressure washer"}))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 201);
    let body: Value = response.json().await.expect("Failed to parse response");
    let request_id = body["id"].as_i64().unwrap();

    // Another user lists an item answering it
    let response = client
        .post(format!("{}/items", BASE_URL))
        .header(USER_HEADER, owner_id)
        .json(&json!({
            "name": "Pressure washer",
            "description": "2000 PSI",
            "available": true,
            "request_id": request_id
        }))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 201);

    // The requester sees the answering item on their request
    let response = client
        .get(format!("{}/requests/{}", BASE_URL, request_id))
        .header(USER_HEADER, requester_id)
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 200);
    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["items"].as_array().unwrap().len(), 1);

    // Own requests listing contains it; another user's "all" listing too
    let response = client
        .get(format!("{}/requests", BASE_URL))
        .header(USER_HEADER, requester_id)
        .send()
        .await
        .expect("Failed to send request");
    let body: Value = response.json().await.expect("Failed to parse response");
    assert!(body
        .as_array()
        .unwrap()
        .iter()
        .any(|r| r["id"].as_i64() == Some(request_id)));

    let response = client
        .get(format!("{}/requests/all?from=0&size=50", BASE_URL))
        .header(USER_HEADER, owner_id)
        .send()
        .await
        .expect("Failed to send request");
    let body: Value = response.json().await.expect("Failed to parse response");
    assert!(body
        .as_array()
        .unwrap()
        .iter()
        .any(|r| r["id"].as_i64() == Some(request_id)));
}

#[tokio::test]
#[ignore]
async fn test_owner_sees_item_bookings_others_do_not() {
    let client = Client::new();
    let owner_id = create_user(&client, "Owner").await;
    let booker_id = create_user(&client, "Booker").await;
    let item_id = create_item(&client, owner_id, "Chainsaw", true).await;

    let response = book_item(&client, booker_id, item_id, Duration::hours(1), Duration::hours(2)).await;
    assert_eq!(response.status(), 201);

    let response = client
        .get(format!("{}/items/{}", BASE_URL, item_id))
        .header(USER_HEADER, owner_id)
        .send()
        .await
        .expect("Failed to send request");
    let body: Value = response.json().await.expect("Failed to parse response");
    assert!(!body["next_booking"].is_null());

    let response = client
        .get(format!("{}/items/{}", BASE_URL, item_id))
        .header(USER_HEADER, booker_id)
        .send()
        .await
        .expect("Failed to send request");
    let body: Value = response.json().await.expect("Failed to parse response");
    assert!(body["next_booking"].is_null());
    assert!(body["last_booking"].is_null());
}
