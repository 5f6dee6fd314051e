use std::sync::Arc;
use tracing::info;
use validator::Validate;

use super::notifier::{Notification, Notifier};
use super::parse_show_date;
use crate::error::{AppError, AppResult, StoreContext};
use crate::models::{BookingDetails, BookingSnapshot, CreateBookingRequest, NewBooking};
use crate::pagination::{Page, PageRequest};
use crate::store::{BookingLedger, CatalogStore, Storage};

#[derive(Clone)]
pub struct BookingService {
    store: Arc<dyn Storage>,
    notifier: Notifier,
}

impl BookingService {
    pub fn new(store: Arc<dyn Storage>, notifier: Notifier) -> Self {
        Self { store, notifier }
    }

    /// Reserves one seat for one showing on behalf of `user_id`.
    ///
    /// Checks run in order and the first failure wins; nothing is written unless
    /// every check passes. The final claim is a single atomic ledger operation, so of
    /// any number of concurrent requests for the same showing exactly one succeeds.
    pub async fn create_booking(&self, user_id: i64, req: CreateBookingRequest) -> AppResult<BookingSnapshot> {
        let show_date = parse_show_date(&req.date)?;

        let seat = self
            .store
            .get_seat(req.seat_id)
            .await
            .context("load seat")?
            .ok_or(AppError::NotFound("seat"))?;
        let cinema = self
            .store
            .get_cinema(req.cinema_id)
            .await
            .context("load cinema")?
            .ok_or(AppError::NotFound("cinema"))?;
        if seat.cinema_id != cinema.id {
            return Err(AppError::invalid("seat does not belong to cinema"));
        }
        req.validate()?;

        // Cheap early rejection; reserve_seat re-checks under lock.
        if self
            .store
            .is_seat_booked(seat.id, show_date, &req.time)
            .await
            .context("check seat")?
        {
            return Err(AppError::Conflict("seat already booked".into()));
        }

        let booking = self
            .store
            .reserve_seat(NewBooking {
                user_id,
                cinema_id: cinema.id,
                seat_id: seat.id,
                show_date,
                show_time: req.time,
                total_price: seat.price,
                payment_method: req.payment_method,
            })
            .await
            .context("reserve seat")?;

        info!(booking_id = booking.id, user_id, seat_id = seat.id, "booking created");
        let snapshot = BookingSnapshot::from(&booking);
        self.notifier.notify(Notification::BookingCreated { user_id, booking: snapshot.clone() });
        Ok(snapshot)
    }

    /// One of the caller's bookings with its cinema and seat.
    pub async fn get_booking(&self, user_id: i64, booking_id: i64) -> AppResult<BookingDetails> {
        let details = self
            .store
            .get_booking_details(booking_id)
            .await
            .context("load booking")?
            .ok_or(AppError::NotFound("booking"))?;
        if details.booking.user_id != user_id {
            return Err(AppError::Unauthorized("booking belongs to another user".into()));
        }
        Ok(details)
    }

    pub async fn get_user_bookings(&self, user_id: i64, page: PageRequest) -> AppResult<Page<BookingDetails>> {
        let (bookings, total) = self
            .store
            .user_bookings(user_id, page)
            .await
            .context("list bookings")?;
        Ok(Page::new(bookings, page, total))
    }
}
