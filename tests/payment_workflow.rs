//! Payment workflow: ownership, amount exactness and method checks.

#![allow(clippy::unwrap_used, clippy::expect_used)]

mod common;

use common::{harness, offered_seat, Harness, SHOW_TIME};

use cinema_booking::{
    error::AppError,
    models::{BookingSnapshot, BookingStatus, CreateBookingRequest, PaymentRequest, PaymentStatus, TransactionStatus},
    store::{BookingLedger, PaymentStore},
};

async fn booked(h: &Harness, user_id: i64, price: f64) -> BookingSnapshot {
    let (cinema, seat) = offered_seat(&h.store, price).await;
    h.state
        .bookings
        .create_booking(
            user_id,
            CreateBookingRequest {
                cinema_id: cinema.id,
                seat_id: seat.id,
                date: "2026-01-15".to_string(),
                time: SHOW_TIME.to_string(),
                payment_method: "cash".to_string(),
            },
        )
        .await
        .unwrap()
}

fn pay(booking_id: i64, method: &str, amount: f64) -> PaymentRequest {
    PaymentRequest { booking_id, payment_method: method.to_string(), amount }
}

async fn assert_untouched(h: &Harness, booking_id: i64) {
    let stored = h.store.get_booking(booking_id).await.unwrap().unwrap();
    assert_eq!(stored.status, BookingStatus::Pending);
    assert_eq!(stored.payment_status, PaymentStatus::Pending);
    assert!(h.store.payment_by_booking(booking_id).await.unwrap().is_none());
}

#[tokio::test]
async fn owner_paying_the_exact_price_confirms_the_booking() {
    let mut h = harness().await;
    let booking = booked(&h, 3, 50000.0).await;

    let payment = h.state.payments.process_payment(3, pay(booking.id, "credit_card", 50000.0)).await.unwrap();
    assert_eq!(payment.status, TransactionStatus::Success);
    assert_eq!(payment.amount, 50000.0);
    assert_eq!(payment.payment_method, "credit_card");

    let stored = h.store.get_booking(booking.id).await.unwrap().unwrap();
    assert_eq!(stored.status, BookingStatus::Confirmed);
    assert_eq!(stored.payment_status, PaymentStatus::Paid);
    assert_eq!(h.store.payment_by_booking(booking.id).await.unwrap().unwrap().id, payment.id);

    let kinds: Vec<&str> = std::iter::from_fn(|| h.notifications.try_recv().ok())
        .map(|n| n.kind())
        .collect();
    assert_eq!(kinds, ["booking_created", "payment_confirmed"]);
}

#[tokio::test]
async fn another_users_booking_is_unauthorized() {
    let h = harness().await;
    let booking = booked(&h, 3, 50000.0).await;

    let err = h.state.payments.process_payment(4, pay(booking.id, "cash", 50000.0)).await.unwrap_err();
    assert!(matches!(err, AppError::Unauthorized(_)));
    assert_untouched(&h, booking.id).await;
}

#[tokio::test]
async fn amount_must_match_exactly() {
    let h = harness().await;
    let booking = booked(&h, 3, 50000.0).await;

    for amount in [50000.01, 49999.99, 70000.0] {
        let err = h.state.payments.process_payment(3, pay(booking.id, "cash", amount)).await.unwrap_err();
        assert!(matches!(err, AppError::InvalidInput(ref m) if m == "amount mismatch"), "{amount}");
    }
    assert_untouched(&h, booking.id).await;
}

#[tokio::test]
async fn unknown_method_is_rejected() {
    let h = harness().await;
    let booking = booked(&h, 3, 50000.0).await;

    let err = h.state.payments.process_payment(3, pay(booking.id, "bitcoin", 50000.0)).await.unwrap_err();
    assert!(matches!(err, AppError::InvalidInput(ref m) if m == "invalid payment method"));
    assert_untouched(&h, booking.id).await;
}

#[tokio::test]
async fn missing_booking_is_not_found() {
    let h = harness().await;
    let err = h.state.payments.process_payment(3, pay(42, "cash", 50000.0)).await.unwrap_err();
    assert!(matches!(err, AppError::NotFound("booking")));
}

#[tokio::test]
async fn methods_are_listed_by_name() {
    let h = harness().await;
    let methods = h.state.payments.get_payment_methods().await.unwrap();
    let names: Vec<&str> = methods.iter().map(|m| m.name.as_str()).collect();
    assert_eq!(names, ["cash", "credit_card"]);
}

#[tokio::test]
async fn ownership_is_checked_before_the_amount() {
    let h = harness().await;
    let booking = booked(&h, 3, 50000.0).await;

    for amount in [0.0, -1.0] {
        let err = h.state.payments.process_payment(4, pay(booking.id, "cash", amount)).await.unwrap_err();
        assert!(matches!(err, AppError::Unauthorized(_)), "amount {amount}: {err:?}");
    }

    let err = h.state.payments.process_payment(3, pay(booking.id, "cash", 0.0)).await.unwrap_err();
    assert!(matches!(err, AppError::InvalidInput(ref m) if m == "amount mismatch"));

    let err = h.state.payments.process_payment(4, pay(booking.id, "", 0.0)).await.unwrap_err();
    assert!(matches!(err, AppError::Unauthorized(_)));
    assert_untouched(&h, booking.id).await;
}

#[tokio::test]
async fn non_positive_booking_id_is_simply_not_found() {
    let h = harness().await;
    let err = h.state.payments.process_payment(3, pay(0, "cash", 0.0)).await.unwrap_err();
    assert!(matches!(err, AppError::NotFound("booking")));
}
