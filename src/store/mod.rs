//! Storage seams for the booking backend.
//!
//! Each trait covers one component: the catalog, the per-showing availability index,
//! the booking ledger, payments and users. [`postgres::PgStore`] is the production
//! backend; [`memory::MemoryStore`] keeps everything behind one async mutex and is used
//! by tests and local runs.
//!
//! The two multi-record writes, [`BookingLedger::reserve_seat`] and
//! [`PaymentStore::settle_payment`], are atomic in every backend: either all of their
//! rows change or none do.

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};

use crate::models::{
    Booking, BookingDetails, Cinema, CinemaFilter, EmailVerification, NewBooking, NewCinema, NewPayment, NewSeat,
    NewUser, NewVerification, Payment, PaymentMethod, Seat, SeatAvailability, UnknownVariant, User,
};
use crate::pagination::PageRequest;

pub mod memory;
pub mod postgres;

pub use memory::MemoryStore;
pub use postgres::PgStore;

pub type StoreResult<T> = Result<T, StoreError>;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// A non-cancelled booking already holds the showing.
    #[error("seat is already booked for this showing")]
    SeatTaken,
    /// No availability row exists for the showing.
    #[error("showing is not offered")]
    ShowingNotOffered,
    /// A unique column (username, email, method name...) already has this value.
    #[error("{0} already exists")]
    Duplicate(&'static str),
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("session cache error: {0}")]
    Cache(#[from] redis::RedisError),
    #[error("corrupt row: {0}")]
    Corrupt(#[from] UnknownVariant),
}

#[async_trait]
pub trait CatalogStore: Send + Sync {
    async fn get_cinema(&self, id: i64) -> StoreResult<Option<Cinema>>;

    async fn get_seat(&self, id: i64) -> StoreResult<Option<Seat>>;

    /// One page of cinemas ordered by name, plus the total matching count.
    async fn list_cinemas(&self, filter: &CinemaFilter, page: PageRequest) -> StoreResult<(Vec<Cinema>, i64)>;

    async fn create_cinema(&self, cinema: NewCinema) -> StoreResult<Cinema>;

    async fn create_seat(&self, seat: NewSeat) -> StoreResult<Seat>;
}

#[async_trait]
pub trait AvailabilityStore: Send + Sync {
    /// Every availability row offered for the showing, with seat info, ordered by row
    /// then seat number.
    async fn get_availability(&self, cinema_id: i64, date: NaiveDate, time: &str)
        -> StoreResult<Vec<SeatAvailability>>;

    /// Idempotent upsert of the flag for `(seat, date, time)`.
    async fn set_availability(&self, seat: &Seat, date: NaiveDate, time: &str, available: bool) -> StoreResult<()>;

    /// Offers a showing: one available row per seat of the cinema. Existing rows are
    /// left untouched. Returns the number of rows created.
    async fn open_showing(&self, cinema_id: i64, date: NaiveDate, time: &str) -> StoreResult<u64>;
}

#[async_trait]
pub trait BookingLedger: Send + Sync {
    /// True iff a non-cancelled booking exists for the exact triple.
    async fn is_seat_booked(&self, seat_id: i64, date: NaiveDate, time: &str) -> StoreResult<bool>;

    /// Atomically claims the showing: checks the availability row exists, checks no
    /// live booking holds it, inserts the booking and marks the row unavailable.
    ///
    /// Fails with [`StoreError::ShowingNotOffered`] or [`StoreError::SeatTaken`]
    /// without writing anything.
    async fn reserve_seat(&self, booking: NewBooking) -> StoreResult<Booking>;

    async fn get_booking(&self, id: i64) -> StoreResult<Option<Booking>>;

    /// One booking with cinema and seat attached.
    async fn get_booking_details(&self, id: i64) -> StoreResult<Option<BookingDetails>>;

    /// A user's bookings, newest first, with cinema and seat attached.
    async fn user_bookings(&self, user_id: i64, page: PageRequest) -> StoreResult<(Vec<BookingDetails>, i64)>;
}

#[async_trait]
pub trait PaymentStore: Send + Sync {
    /// Active methods ordered by name.
    async fn payment_methods(&self) -> StoreResult<Vec<PaymentMethod>>;

    /// Active method with this exact name.
    async fn payment_method_by_name(&self, name: &str) -> StoreResult<Option<PaymentMethod>>;

    async fn create_payment_method(&self, name: &str, method_type: &str) -> StoreResult<PaymentMethod>;

    /// Atomically records the payment and marks its booking paid and confirmed.
    async fn settle_payment(&self, payment: NewPayment) -> StoreResult<Payment>;

    /// Most recent payment for a booking.
    async fn payment_by_booking(&self, booking_id: i64) -> StoreResult<Option<Payment>>;
}

#[async_trait]
pub trait UserStore: Send + Sync {
    async fn create_user(&self, user: NewUser) -> StoreResult<User>;

    async fn user_by_id(&self, id: i64) -> StoreResult<Option<User>>;

    async fn user_by_username(&self, username: &str) -> StoreResult<Option<User>>;

    async fn user_by_email(&self, email: &str) -> StoreResult<Option<User>>;

    async fn create_verification(&self, verification: NewVerification) -> StoreResult<EmailVerification>;

    /// Newest verification record for the address.
    async fn latest_verification(&self, email: &str) -> StoreResult<Option<EmailVerification>>;

    /// Marks the record and its user verified together.
    async fn confirm_verification(&self, verification_id: i64, user_id: i64) -> StoreResult<()>;

    /// Removes unverified records that expired before `now`.
    async fn delete_expired_verifications(&self, now: DateTime<Utc>) -> StoreResult<u64>;
}

/// Everything the services need from one backend.
pub trait Storage: CatalogStore + AvailabilityStore + BookingLedger + PaymentStore + UserStore {}

impl<T> Storage for T where T: CatalogStore + AvailabilityStore + BookingLedger + PaymentStore + UserStore {}
