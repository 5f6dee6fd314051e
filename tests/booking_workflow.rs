//! Booking workflow against the in-memory backend.

#![allow(clippy::unwrap_used, clippy::expect_used)]

mod common;

use common::{harness, offered_seat, show_date, SHOW_TIME};

use cinema_booking::{
    error::AppError,
    models::{BookingStatus, CreateBookingRequest, PaymentRequest, PaymentStatus},
    pagination::PageRequest,
    services::Notification,
    store::{AvailabilityStore, BookingLedger},
};

fn request(cinema_id: i64, seat_id: i64) -> CreateBookingRequest {
    CreateBookingRequest {
        cinema_id,
        seat_id,
        date: "2026-01-15".to_string(),
        time: SHOW_TIME.to_string(),
        payment_method: "cash".to_string(),
    }
}

#[tokio::test]
async fn book_then_pay_scenario() {
    let mut h = harness().await;
    let (cinema, seat) = offered_seat(&h.store, 70000.0).await;

    let booking = h.state.bookings.create_booking(1, request(cinema.id, seat.id)).await.unwrap();
    assert_eq!(booking.status, BookingStatus::Pending);
    assert_eq!(booking.payment_status, PaymentStatus::Pending);
    assert_eq!(booking.total_price, 70000.0);
    assert!(matches!(h.notifications.try_recv(), Ok(Notification::BookingCreated { user_id: 1, .. })));

    let again = h.state.bookings.create_booking(1, request(cinema.id, seat.id)).await;
    assert!(matches!(again, Err(AppError::Conflict(ref m)) if m == "seat already booked"));

    let payment = h
        .state
        .payments
        .process_payment(
            1,
            PaymentRequest { booking_id: booking.id, payment_method: "cash".to_string(), amount: 70000.0 },
        )
        .await
        .unwrap();
    assert_eq!(payment.transaction_id, format!("TXN-{}-1", booking.id));

    let stored = h.store.get_booking(booking.id).await.unwrap().unwrap();
    assert_eq!(stored.status, BookingStatus::Confirmed);
    assert_eq!(stored.payment_status, PaymentStatus::Paid);
}

#[tokio::test]
async fn booking_marks_the_showing_unavailable() {
    let h = harness().await;
    let (cinema, seat) = offered_seat(&h.store, 50000.0).await;
    h.state.bookings.create_booking(7, request(cinema.id, seat.id)).await.unwrap();

    let report = h.state.seats.get_seat_availability(cinema.id, "2026-01-15", SHOW_TIME).await.unwrap();
    assert_eq!(report.total_available, 0);
    assert_eq!(report.total_unavailable, 1);
    assert_eq!(report.unavailable_seats[0].seat.seat_number, "3C");
    assert!(h.store.is_seat_booked(seat.id, show_date(), SHOW_TIME).await.unwrap());
}

#[tokio::test]
async fn seat_from_another_cinema_is_rejected_without_writes() {
    let h = harness().await;
    let (_, seat) = offered_seat(&h.store, 50000.0).await;
    let other = common::cinema(&h.store, "Cinemaxx - Surabaya").await;

    let err = h.state.bookings.create_booking(1, request(other.id, seat.id)).await.unwrap_err();
    assert!(matches!(err, AppError::InvalidInput(ref m) if m == "seat does not belong to cinema"));

    let page = h.state.bookings.get_user_bookings(1, PageRequest::default()).await.unwrap();
    assert_eq!(page.total, 0);
    let rows = h.store.get_availability(seat.cinema_id, show_date(), SHOW_TIME).await.unwrap();
    assert!(rows[0].is_available);
}

#[tokio::test]
async fn malformed_date_is_invalid_input() {
    let h = harness().await;
    let (cinema, seat) = offered_seat(&h.store, 50000.0).await;
    let mut req = request(cinema.id, seat.id);
    req.date = "15-01-2026".to_string();

    let err = h.state.bookings.create_booking(1, req).await.unwrap_err();
    assert!(matches!(err, AppError::InvalidInput(_)));
}

#[tokio::test]
async fn missing_seat_and_cinema_are_not_found() {
    let h = harness().await;
    let (cinema, seat) = offered_seat(&h.store, 50000.0).await;

    let err = h.state.bookings.create_booking(1, request(cinema.id, 999)).await.unwrap_err();
    assert!(matches!(err, AppError::NotFound("seat")));

    let err = h.state.bookings.create_booking(1, request(999, seat.id)).await.unwrap_err();
    assert!(matches!(err, AppError::NotFound("cinema")));
}

#[tokio::test]
async fn showing_that_was_never_offered_is_not_found() {
    let h = harness().await;
    let (cinema, seat) = offered_seat(&h.store, 50000.0).await;
    let mut req = request(cinema.id, seat.id);
    req.time = "23:30".to_string();

    let err = h.state.bookings.create_booking(1, req).await.unwrap_err();
    assert!(matches!(err, AppError::NotFound("showing")));
    assert_eq!(h.state.bookings.get_user_bookings(1, PageRequest::default()).await.unwrap().total, 0);
}

#[tokio::test]
async fn price_is_captured_from_the_catalog() {
    let h = harness().await;
    let cinema = common::cinema(&h.store, "Studio 21 - Bali").await;
    for (label, price) in [("1A", 50000.0), ("3A", 70000.0), ("5A", 100000.0)] {
        let seat = common::seat(&h.store, &cinema, label, price).await;
        h.store.set_availability(&seat, show_date(), SHOW_TIME, true).await.unwrap();
        let booking = h.state.bookings.create_booking(1, request(cinema.id, seat.id)).await.unwrap();
        assert_eq!(booking.total_price, price);
    }
}

#[tokio::test]
async fn user_bookings_are_paginated_newest_first() {
    let h = harness().await;
    let cinema = common::cinema(&h.store, "Premiere Cinema - Bandung").await;
    let mut ids = Vec::new();
    for n in 1..=3 {
        let seat = common::seat(&h.store, &cinema, &format!("1{n}"), 50000.0).await;
        h.store.set_availability(&seat, show_date(), SHOW_TIME, true).await.unwrap();
        ids.push(h.state.bookings.create_booking(5, request(cinema.id, seat.id)).await.unwrap().id);
    }

    let first = h.state.bookings.get_user_bookings(5, PageRequest::new(Some(1), Some(2))).await.unwrap();
    assert_eq!(first.total, 3);
    assert_eq!(first.total_pages, 2);
    assert_eq!(first.data.len(), 2);
    assert_eq!(first.data[0].booking.id, ids[2]);
    assert_eq!(first.data[0].cinema.name, "Premiere Cinema - Bandung");

    let second = h.state.bookings.get_user_bookings(5, PageRequest::new(Some(2), Some(2))).await.unwrap();
    assert_eq!(second.data.len(), 1);
    assert_eq!(second.data[0].booking.id, ids[0]);

    assert_eq!(h.state.bookings.get_user_bookings(6, PageRequest::default()).await.unwrap().total, 0);
}

/// Many users race for the same showing; exactly one wins.
#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_requests_never_double_book() {
    let h = harness().await;
    let (cinema, seat) = offered_seat(&h.store, 70000.0).await;

    let attempts = 32;
    let mut handles = Vec::with_capacity(attempts);
    for user_id in 1..=attempts as i64 {
        let state = h.state.clone();
        let req = request(cinema.id, seat.id);
        handles.push(tokio::spawn(async move { state.bookings.create_booking(user_id, req).await }));
    }

    let mut successes = 0;
    let mut conflicts = 0;
    for handle in handles {
        match handle.await.unwrap() {
            Ok(_) => successes += 1,
            Err(AppError::Conflict(_)) => conflicts += 1,
            Err(other) => panic!("unexpected error: {other}"),
        }
    }
    assert_eq!(successes, 1);
    assert_eq!(conflicts, attempts - 1);
}

#[tokio::test]
async fn checks_fail_in_workflow_order() {
    let h = harness().await;
    let (cinema, seat) = offered_seat(&h.store, 50000.0).await;

    let mut req = request(cinema.id, seat.id);
    req.date = "15-01-2026".to_string();
    req.time = String::new();
    let err = h.state.bookings.create_booking(1, req).await.unwrap_err();
    assert!(matches!(err, AppError::InvalidInput(ref m) if m.contains("invalid date")), "{err:?}");

    let mut req = request(cinema.id, 0);
    req.payment_method = String::new();
    let err = h.state.bookings.create_booking(1, req).await.unwrap_err();
    assert!(matches!(err, AppError::NotFound("seat")), "{err:?}");

    let err = h.state.bookings.create_booking(1, request(0, seat.id)).await.unwrap_err();
    assert!(matches!(err, AppError::NotFound("cinema")), "{err:?}");

    let mut req = request(cinema.id, seat.id);
    req.time = String::new();
    let err = h.state.bookings.create_booking(1, req).await.unwrap_err();
    assert!(matches!(err, AppError::InvalidInput(ref m) if m == "time has an invalid length"), "{err:?}");

    let page = h.state.bookings.get_user_bookings(1, PageRequest::default()).await.unwrap();
    assert_eq!(page.total, 0);
}

#[tokio::test]
async fn single_booking_lookup_is_owner_only() {
    let h = harness().await;
    let (cinema, seat) = offered_seat(&h.store, 70000.0).await;
    let booking = h.state.bookings.create_booking(5, request(cinema.id, seat.id)).await.unwrap();

    let details = h.state.bookings.get_booking(5, booking.id).await.unwrap();
    assert_eq!(details.booking.id, booking.id);
    assert_eq!(details.cinema.name, "CGV Cinemas - Jakarta");
    assert_eq!(details.seat.seat_number, "3C");

    let err = h.state.bookings.get_booking(6, booking.id).await.unwrap_err();
    assert!(matches!(err, AppError::Unauthorized(_)));

    let err = h.state.bookings.get_booking(5, booking.id + 100).await.unwrap_err();
    assert!(matches!(err, AppError::NotFound("booking")));
}
