use std::collections::BTreeMap;

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use tokio::sync::Mutex;

use super::{AvailabilityStore, BookingLedger, CatalogStore, PaymentStore, StoreError, StoreResult, UserStore};
use crate::models::{
    Booking, BookingDetails, BookingStatus, Cinema, CinemaFilter, EmailVerification, NewBooking, NewCinema,
    NewPayment, NewSeat, NewUser, NewVerification, Payment, PaymentMethod, PaymentStatus, Seat, SeatAvailability,
    User,
};
use crate::pagination::PageRequest;

type ShowingKey = (i64, NaiveDate, String);

struct ShowingRow {
    id: i64,
    cinema_id: i64,
    is_available: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

#[derive(Default)]
struct Sequences {
    cinema: i64,
    seat: i64,
    showing: i64,
    booking: i64,
    method: i64,
    payment: i64,
    user: i64,
    verification: i64,
}

fn next(seq: &mut i64) -> i64 {
    *seq += 1;
    *seq
}

#[derive(Default)]
struct Tables {
    seq: Sequences,
    cinemas: BTreeMap<i64, Cinema>,
    seats: BTreeMap<i64, Seat>,
    showings: BTreeMap<ShowingKey, ShowingRow>,
    bookings: BTreeMap<i64, Booking>,
    methods: BTreeMap<i64, PaymentMethod>,
    payments: BTreeMap<i64, Payment>,
    users: BTreeMap<i64, User>,
    verifications: BTreeMap<i64, EmailVerification>,
}

impl Tables {
    fn seat_held(&self, seat_id: i64, date: NaiveDate, time: &str) -> bool {
        self.bookings
            .values()
            .any(|b| b.seat_id == seat_id && b.show_date == date && b.show_time == time && b.status.holds_seat())
    }

    fn details(&self, booking: &Booking) -> Option<BookingDetails> {
        Some(BookingDetails {
            booking: booking.clone(),
            cinema: self.cinemas.get(&booking.cinema_id)?.clone(),
            seat: self.seats.get(&booking.seat_id)?.clone(),
        })
    }
}

/// Process-local storage. Each operation holds the table lock for its whole body, so
/// every operation is atomic with respect to the others.
#[derive(Default)]
pub struct MemoryStore {
    tables: Mutex<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CatalogStore for MemoryStore {
    async fn get_cinema(&self, id: i64) -> StoreResult<Option<Cinema>> {
        Ok(self.tables.lock().await.cinemas.get(&id).cloned())
    }

    async fn get_seat(&self, id: i64) -> StoreResult<Option<Seat>> {
        Ok(self.tables.lock().await.seats.get(&id).cloned())
    }

    async fn list_cinemas(&self, filter: &CinemaFilter, page: PageRequest) -> StoreResult<(Vec<Cinema>, i64)> {
        let t = self.tables.lock().await;
        let mut matching: Vec<&Cinema> = t.cinemas.values().filter(|c| filter.matches(c)).collect();
        matching.sort_by(|a, b| a.name.cmp(&b.name).then(a.id.cmp(&b.id)));

        let total = matching.len() as i64;
        let data = matching
            .into_iter()
            .skip(page.offset() as usize)
            .take(page.limit as usize)
            .cloned()
            .collect();
        Ok((data, total))
    }

    async fn create_cinema(&self, cinema: NewCinema) -> StoreResult<Cinema> {
        let mut t = self.tables.lock().await;
        let now = Utc::now();
        let row = Cinema {
            id: next(&mut t.seq.cinema),
            name: cinema.name,
            location: cinema.location,
            city: cinema.city,
            address: cinema.address,
            total_seats: cinema.total_seats,
            image_url: cinema.image_url,
            created_at: now,
            updated_at: now,
        };
        t.cinemas.insert(row.id, row.clone());
        Ok(row)
    }

    async fn create_seat(&self, seat: NewSeat) -> StoreResult<Seat> {
        let mut t = self.tables.lock().await;
        if t.seats.values().any(|s| s.cinema_id == seat.cinema_id && s.seat_number == seat.seat_number) {
            return Err(StoreError::Duplicate("seat"));
        }
        let now = Utc::now();
        let row = Seat {
            id: next(&mut t.seq.seat),
            cinema_id: seat.cinema_id,
            seat_number: seat.seat_number,
            row_number: seat.row_number,
            seat_type: seat.seat_type,
            price: seat.price,
            created_at: now,
            updated_at: now,
        };
        t.seats.insert(row.id, row.clone());
        Ok(row)
    }
}

#[async_trait]
impl AvailabilityStore for MemoryStore {
    async fn get_availability(
        &self,
        cinema_id: i64,
        date: NaiveDate,
        time: &str,
    ) -> StoreResult<Vec<SeatAvailability>> {
        let t = self.tables.lock().await;
        let mut rows: Vec<SeatAvailability> = t
            .showings
            .iter()
            .filter(|((_, d, tm), row)| row.cinema_id == cinema_id && *d == date && tm == time)
            .filter_map(|((seat_id, d, tm), row)| {
                let seat = t.seats.get(seat_id)?;
                Some(SeatAvailability {
                    id: row.id,
                    cinema_id: row.cinema_id,
                    seat_id: *seat_id,
                    show_date: *d,
                    show_time: tm.clone(),
                    is_available: row.is_available,
                    created_at: row.created_at,
                    updated_at: row.updated_at,
                    seat: seat.clone(),
                })
            })
            .collect();
        rows.sort_by(|a, b| (a.seat.row_number, &a.seat.seat_number).cmp(&(b.seat.row_number, &b.seat.seat_number)));
        Ok(rows)
    }

    async fn set_availability(&self, seat: &Seat, date: NaiveDate, time: &str, available: bool) -> StoreResult<()> {
        let mut t = self.tables.lock().await;
        let now = Utc::now();
        let key = (seat.id, date, time.to_string());
        if let Some(row) = t.showings.get_mut(&key) {
            row.is_available = available;
            row.updated_at = now;
            return Ok(());
        }
        let id = next(&mut t.seq.showing);
        t.showings.insert(
            key,
            ShowingRow { id, cinema_id: seat.cinema_id, is_available: available, created_at: now, updated_at: now },
        );
        Ok(())
    }

    async fn open_showing(&self, cinema_id: i64, date: NaiveDate, time: &str) -> StoreResult<u64> {
        let mut t = self.tables.lock().await;
        let now = Utc::now();
        let seat_ids: Vec<i64> = t.seats.values().filter(|s| s.cinema_id == cinema_id).map(|s| s.id).collect();

        let mut created = 0;
        for seat_id in seat_ids {
            let key = (seat_id, date, time.to_string());
            if t.showings.contains_key(&key) {
                continue;
            }
            let id = next(&mut t.seq.showing);
            t.showings.insert(key, ShowingRow { id, cinema_id, is_available: true, created_at: now, updated_at: now });
            created += 1;
        }
        Ok(created)
    }
}

#[async_trait]
impl BookingLedger for MemoryStore {
    async fn is_seat_booked(&self, seat_id: i64, date: NaiveDate, time: &str) -> StoreResult<bool> {
        Ok(self.tables.lock().await.seat_held(seat_id, date, time))
    }

    async fn reserve_seat(&self, booking: NewBooking) -> StoreResult<Booking> {
        let mut t = self.tables.lock().await;
        let key = (booking.seat_id, booking.show_date, booking.show_time.clone());
        if !t.showings.contains_key(&key) {
            return Err(StoreError::ShowingNotOffered);
        }
        if t.seat_held(booking.seat_id, booking.show_date, &booking.show_time) {
            return Err(StoreError::SeatTaken);
        }

        let now = Utc::now();
        let row = Booking {
            id: next(&mut t.seq.booking),
            user_id: booking.user_id,
            cinema_id: booking.cinema_id,
            seat_id: booking.seat_id,
            show_date: booking.show_date,
            show_time: booking.show_time,
            booking_date: now,
            status: BookingStatus::Pending,
            total_price: booking.total_price,
            payment_method: booking.payment_method,
            payment_status: PaymentStatus::Pending,
            created_at: now,
            updated_at: now,
        };
        t.bookings.insert(row.id, row.clone());
        if let Some(showing) = t.showings.get_mut(&key) {
            showing.is_available = false;
            showing.updated_at = now;
        }
        Ok(row)
    }

    async fn get_booking(&self, id: i64) -> StoreResult<Option<Booking>> {
        Ok(self.tables.lock().await.bookings.get(&id).cloned())
    }

    async fn get_booking_details(&self, id: i64) -> StoreResult<Option<BookingDetails>> {
        let t = self.tables.lock().await;
        Ok(t.bookings.get(&id).and_then(|b| t.details(b)))
    }

    async fn user_bookings(&self, user_id: i64, page: PageRequest) -> StoreResult<(Vec<BookingDetails>, i64)> {
        let t = self.tables.lock().await;
        let mut mine: Vec<&Booking> = t.bookings.values().filter(|b| b.user_id == user_id).collect();
        mine.sort_by(|a, b| b.booking_date.cmp(&a.booking_date).then(b.id.cmp(&a.id)));

        let total = mine.len() as i64;
        let data = mine
            .into_iter()
            .skip(page.offset() as usize)
            .take(page.limit as usize)
            .filter_map(|b| t.details(b))
            .collect();
        Ok((data, total))
    }
}

#[async_trait]
impl PaymentStore for MemoryStore {
    async fn payment_methods(&self) -> StoreResult<Vec<PaymentMethod>> {
        let t = self.tables.lock().await;
        let mut methods: Vec<PaymentMethod> = t.methods.values().filter(|m| m.is_active).cloned().collect();
        methods.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(methods)
    }

    async fn payment_method_by_name(&self, name: &str) -> StoreResult<Option<PaymentMethod>> {
        let t = self.tables.lock().await;
        Ok(t.methods.values().find(|m| m.is_active && m.name == name).cloned())
    }

    async fn create_payment_method(&self, name: &str, method_type: &str) -> StoreResult<PaymentMethod> {
        let mut t = self.tables.lock().await;
        if t.methods.values().any(|m| m.name == name) {
            return Err(StoreError::Duplicate("payment method"));
        }
        let now = Utc::now();
        let row = PaymentMethod {
            id: next(&mut t.seq.method),
            name: name.to_string(),
            method_type: method_type.to_string(),
            is_active: true,
            created_at: now,
            updated_at: now,
        };
        t.methods.insert(row.id, row.clone());
        Ok(row)
    }

    async fn settle_payment(&self, payment: NewPayment) -> StoreResult<Payment> {
        let mut t = self.tables.lock().await;
        if !t.bookings.contains_key(&payment.booking_id) {
            return Err(StoreError::Database(sqlx::Error::RowNotFound));
        }

        let now = Utc::now();
        let row = Payment {
            id: next(&mut t.seq.payment),
            booking_id: payment.booking_id,
            user_id: payment.user_id,
            amount: payment.amount,
            payment_method: payment.payment_method,
            status: payment.status,
            transaction_id: payment.transaction_id,
            created_at: now,
            updated_at: now,
        };
        t.payments.insert(row.id, row.clone());
        if let Some(booking) = t.bookings.get_mut(&payment.booking_id) {
            booking.payment_status = PaymentStatus::Paid;
            booking.status = BookingStatus::Confirmed;
            booking.updated_at = now;
        }
        Ok(row)
    }

    async fn payment_by_booking(&self, booking_id: i64) -> StoreResult<Option<Payment>> {
        let t = self.tables.lock().await;
        Ok(t.payments
            .values()
            .filter(|p| p.booking_id == booking_id)
            .max_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)))
            .cloned())
    }
}

#[async_trait]
impl UserStore for MemoryStore {
    async fn create_user(&self, user: NewUser) -> StoreResult<User> {
        let mut t = self.tables.lock().await;
        if t.users.values().any(|u| u.username == user.username) {
            return Err(StoreError::Duplicate("username"));
        }
        if t.users.values().any(|u| u.email == user.email) {
            return Err(StoreError::Duplicate("email"));
        }
        let now = Utc::now();
        let row = User {
            id: next(&mut t.seq.user),
            username: user.username,
            email: user.email,
            password: user.password_hash,
            is_verified: false,
            created_at: now,
            updated_at: now,
        };
        t.users.insert(row.id, row.clone());
        Ok(row)
    }

    async fn user_by_id(&self, id: i64) -> StoreResult<Option<User>> {
        Ok(self.tables.lock().await.users.get(&id).cloned())
    }

    async fn user_by_username(&self, username: &str) -> StoreResult<Option<User>> {
        let t = self.tables.lock().await;
        Ok(t.users.values().find(|u| u.username == username).cloned())
    }

    async fn user_by_email(&self, email: &str) -> StoreResult<Option<User>> {
        let t = self.tables.lock().await;
        Ok(t.users.values().find(|u| u.email == email).cloned())
    }

    async fn create_verification(&self, verification: NewVerification) -> StoreResult<EmailVerification> {
        let mut t = self.tables.lock().await;
        let row = EmailVerification {
            id: next(&mut t.seq.verification),
            user_id: verification.user_id,
            email: verification.email,
            otp_code: verification.otp_code,
            expires_at: verification.expires_at,
            is_verified: false,
            created_at: Utc::now(),
        };
        t.verifications.insert(row.id, row.clone());
        Ok(row)
    }

    async fn latest_verification(&self, email: &str) -> StoreResult<Option<EmailVerification>> {
        let t = self.tables.lock().await;
        Ok(t.verifications
            .values()
            .filter(|v| v.email == email)
            .max_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)))
            .cloned())
    }

    async fn confirm_verification(&self, verification_id: i64, user_id: i64) -> StoreResult<()> {
        let mut t = self.tables.lock().await;
        if let Some(v) = t.verifications.get_mut(&verification_id) {
            v.is_verified = true;
        }
        if let Some(u) = t.users.get_mut(&user_id) {
            u.is_verified = true;
            u.updated_at = Utc::now();
        }
        Ok(())
    }

    async fn delete_expired_verifications(&self, now: DateTime<Utc>) -> StoreResult<u64> {
        let mut t = self.tables.lock().await;
        let before = t.verifications.len();
        t.verifications.retain(|_, v| v.is_verified || v.expires_at >= now);
        Ok((before - t.verifications.len()) as u64)
    }
}
