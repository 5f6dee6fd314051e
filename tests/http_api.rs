//! End-to-end HTTP tests: the real router on an ephemeral port, driven by reqwest.

#![allow(clippy::unwrap_used, clippy::expect_used)]

mod common;

use reqwest::StatusCode;
use serde_json::{json, Value};
use std::sync::Arc;

use cinema_booking::AppState;

async fn serve(state: Arc<AppState>) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let app = cinema_booking::app(state);
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{addr}")
}

async fn login(client: &reqwest::Client, base: &str) -> String {
    let resp = client
        .post(format!("{base}/api/register"))
        .json(&json!({ "username": "andre", "email": "andre@example.com", "password": "secret123" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::CREATED);

    let body: Value = client
        .post(format!("{base}/api/login"))
        .json(&json!({ "username": "andre", "password": "secret123" }))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    body["token"].as_str().unwrap().to_string()
}

#[tokio::test]
async fn health() {
    let h = common::harness().await;
    let base = serve(h.state.clone()).await;
    let body = reqwest::get(format!("{base}/health")).await.unwrap().text().await.unwrap();
    assert_eq!(body, "OK");
}

#[tokio::test]
async fn booking_and_payment_over_http() {
    let h = common::harness().await;
    let (cinema, seat) = common::offered_seat(&h.store, 70000.0).await;
    let base = serve(h.state.clone()).await;
    let client = reqwest::Client::new();
    let token = login(&client, &base).await;

    let seats: Value = client
        .get(format!("{base}/api/cinemas/{}/seats?date=2026-01-15&time=19:00", cinema.id))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(seats["total_available"], 1);
    assert_eq!(seats["available_seats"][0]["seat"]["seat_number"], "3C");

    let booking_body = json!({
        "cinema_id": cinema.id,
        "seat_id": seat.id,
        "date": "2026-01-15",
        "time": "19:00",
        "payment_method": "cash",
    });

    let resp = client.post(format!("{base}/api/booking")).json(&booking_body).send().await.unwrap();
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    let err: Value = resp.json().await.unwrap();
    assert_eq!(err["success"], false);

    let resp = client
        .post(format!("{base}/api/booking"))
        .bearer_auth(&token)
        .json(&booking_body)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::CREATED);
    let booking: Value = resp.json().await.unwrap();
    assert_eq!(booking["status"], "pending");
    assert_eq!(booking["total_price"], 70000.0);

    let resp = client
        .post(format!("{base}/api/booking"))
        .bearer_auth(&token)
        .json(&booking_body)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::CONFLICT);
    let err: Value = resp.json().await.unwrap();
    assert_eq!(err["message"], "seat already booked");

    let resp = client
        .post(format!("{base}/api/pay"))
        .bearer_auth(&token)
        .json(&json!({ "booking_id": booking["id"], "payment_method": "cash", "amount": 70000.0 }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::CREATED);

    let history: Value = client
        .get(format!("{base}/api/user/bookings?page=0&limit=500"))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(history["page"], 1);
    assert_eq!(history["limit"], 10);
    assert_eq!(history["total"], 1);
    assert_eq!(history["data"][0]["status"], "confirmed");
    assert_eq!(history["data"][0]["payment_status"], "paid");
    assert_eq!(history["data"][0]["cinema"]["name"], "CGV Cinemas - Jakarta");

    let one: Value = client
        .get(format!("{base}/api/bookings/{}", booking["id"]))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(one["id"], booking["id"]);
    assert_eq!(one["seat"]["seat_number"], "3C");
}

#[tokio::test]
async fn catalog_endpoints() {
    let h = common::harness().await;
    let (cinema, _) = common::offered_seat(&h.store, 50000.0).await;
    common::cinema(&h.store, "Cinemaxx - Surabaya").await;
    let base = serve(h.state.clone()).await;
    let client = reqwest::Client::new();

    let page: Value = client
        .get(format!("{base}/api/cinemas?name=cgv"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(page["total"], 1);
    assert_eq!(page["data"][0]["id"], cinema.id);

    let resp = client.get(format!("{base}/api/cinemas/{}", cinema.id)).send().await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);

    let resp = client.get(format!("{base}/api/cinemas/9999")).send().await.unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);

    let resp = client
        .get(format!("{base}/api/cinemas/{}/seats?date=yesterday&time=19:00", cinema.id))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let methods: Value = client.get(format!("{base}/api/payment-methods")).send().await.unwrap().json().await.unwrap();
    assert_eq!(methods[0]["name"], "cash");
    assert_eq!(methods[0]["type"], "cash");
}

#[tokio::test]
async fn profile_and_logout() {
    let h = common::harness().await;
    let base = serve(h.state.clone()).await;
    let client = reqwest::Client::new();
    let token = login(&client, &base).await;

    let profile: Value = client
        .get(format!("{base}/api/user/profile"))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(profile["username"], "andre");
    assert!(profile.get("password").is_none());

    let resp = client.post(format!("{base}/api/logout")).bearer_auth(&token).send().await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);

    let resp = client.get(format!("{base}/api/user/profile")).bearer_auth(&token).send().await.unwrap();
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn malformed_bodies_use_the_error_envelope() {
    let h = common::harness().await;
    let base = serve(h.state.clone()).await;
    let client = reqwest::Client::new();

    let resp = client
        .post(format!("{base}/api/login"))
        .header("content-type", "application/json")
        .body("{not json")
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["success"], false);
    assert!(!body["message"].as_str().unwrap().is_empty());

    let resp = client
        .post(format!("{base}/api/register"))
        .json(&json!({ "username": "andre" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["success"], false);
}
