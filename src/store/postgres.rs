use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use sqlx::{FromRow, PgPool};
use tracing::debug;

use super::{AvailabilityStore, BookingLedger, CatalogStore, PaymentStore, StoreError, StoreResult, UserStore};
use crate::database::Database;
use crate::models::{
    Booking, BookingDetails, BookingStatus, Cinema, CinemaFilter, EmailVerification, NewBooking, NewCinema, NewPayment, NewSeat,
    NewUser, NewVerification, Payment, PaymentMethod, PaymentStatus, Seat, SeatAvailability, User,
};
use crate::pagination::PageRequest;

const CINEMA_COLUMNS: &str =
    "id, name, location, city, address, total_seats, image_url, created_at, updated_at";
const SEAT_COLUMNS: &str =
    "id, cinema_id, seat_number, row_number, seat_type, price::FLOAT8 AS price, created_at, updated_at";
const BOOKING_COLUMNS: &str = "id, user_id, cinema_id, seat_id, show_date, show_time, booking_date, status, \
     total_price::FLOAT8 AS total_price, payment_method, payment_status, created_at, updated_at";
const DETAILS_SELECT: &str = r#"
    SELECT b.id, b.user_id, b.cinema_id, b.seat_id, b.show_date, b.show_time, b.booking_date, b.status,
           b.total_price::FLOAT8 AS total_price, b.payment_method, b.payment_status, b.created_at, b.updated_at,
           c.name AS c_name, c.location AS c_location, c.city AS c_city, c.address AS c_address,
           c.total_seats AS c_total_seats, c.image_url AS c_image_url,
           c.created_at AS c_created_at, c.updated_at AS c_updated_at,
           s.cinema_id AS s_cinema_id, s.seat_number AS s_seat_number, s.row_number AS s_row_number,
           s.seat_type AS s_seat_type, s.price::FLOAT8 AS s_price,
           s.created_at AS s_created_at, s.updated_at AS s_updated_at
    FROM bookings b
    JOIN cinemas c ON c.id = b.cinema_id
    JOIN seats s ON s.id = b.seat_id
"#;
const PAYMENT_COLUMNS: &str = "id, booking_id, user_id, amount::FLOAT8 AS amount, payment_method, status, \
     transaction_id, created_at, updated_at";
const METHOD_COLUMNS: &str = "id, name, type, is_active, created_at, updated_at";
const USER_COLUMNS: &str = "id, username, email, password, is_verified, created_at, updated_at";
const VERIFICATION_COLUMNS: &str = "id, user_id, email, otp_code, expires_at, is_verified, created_at";

/// Postgres-backed storage. Every statement runs on the shared pool; the two
/// multi-record writes run inside a single transaction.
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(db: &Database) -> Self {
        Self { pool: db.pool.clone() }
    }
}

fn unique_violation(err: &sqlx::Error) -> Option<Option<String>> {
    match err {
        sqlx::Error::Database(db) if db.is_unique_violation() => Some(db.constraint().map(str::to_string)),
        _ => None,
    }
}

/* ---------- row mapping ---------- */

#[derive(FromRow)]
struct SeatRow {
    id: i64,
    cinema_id: i64,
    seat_number: String,
    row_number: i32,
    seat_type: String,
    price: f64,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<SeatRow> for Seat {
    type Error = StoreError;

    fn try_from(row: SeatRow) -> Result<Self, Self::Error> {
        Ok(Seat {
            id: row.id,
            cinema_id: row.cinema_id,
            seat_number: row.seat_number,
            row_number: row.row_number,
            seat_type: row.seat_type.parse()?,
            price: row.price,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

#[derive(FromRow)]
struct AvailabilityRow {
    id: i64,
    cinema_id: i64,
    seat_id: i64,
    show_date: NaiveDate,
    show_time: String,
    is_available: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    seat_number: String,
    row_number: i32,
    seat_type: String,
    price: f64,
    seat_created_at: DateTime<Utc>,
    seat_updated_at: DateTime<Utc>,
}

impl TryFrom<AvailabilityRow> for SeatAvailability {
    type Error = StoreError;

    fn try_from(row: AvailabilityRow) -> Result<Self, Self::Error> {
        let seat = Seat {
            id: row.seat_id,
            cinema_id: row.cinema_id,
            seat_number: row.seat_number,
            row_number: row.row_number,
            seat_type: row.seat_type.parse()?,
            price: row.price,
            created_at: row.seat_created_at,
            updated_at: row.seat_updated_at,
        };
        Ok(SeatAvailability {
            id: row.id,
            cinema_id: row.cinema_id,
            seat_id: row.seat_id,
            show_date: row.show_date,
            show_time: row.show_time,
            is_available: row.is_available,
            created_at: row.created_at,
            updated_at: row.updated_at,
            seat,
        })
    }
}

#[derive(FromRow)]
struct BookingRow {
    id: i64,
    user_id: i64,
    cinema_id: i64,
    seat_id: i64,
    show_date: NaiveDate,
    show_time: String,
    booking_date: DateTime<Utc>,
    status: String,
    total_price: f64,
    payment_method: String,
    payment_status: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<BookingRow> for Booking {
    type Error = StoreError;

    fn try_from(row: BookingRow) -> Result<Self, Self::Error> {
        Ok(Booking {
            id: row.id,
            user_id: row.user_id,
            cinema_id: row.cinema_id,
            seat_id: row.seat_id,
            show_date: row.show_date,
            show_time: row.show_time,
            booking_date: row.booking_date,
            status: row.status.parse()?,
            total_price: row.total_price,
            payment_method: row.payment_method,
            payment_status: row.payment_status.parse()?,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

#[derive(FromRow)]
struct BookingDetailsRow {
    #[sqlx(flatten)]
    booking: BookingRow,
    c_name: String,
    c_location: String,
    c_city: String,
    c_address: String,
    c_total_seats: i32,
    c_image_url: String,
    c_created_at: DateTime<Utc>,
    c_updated_at: DateTime<Utc>,
    s_cinema_id: i64,
    s_seat_number: String,
    s_row_number: i32,
    s_seat_type: String,
    s_price: f64,
    s_created_at: DateTime<Utc>,
    s_updated_at: DateTime<Utc>,
}

impl TryFrom<BookingDetailsRow> for BookingDetails {
    type Error = StoreError;

    fn try_from(row: BookingDetailsRow) -> Result<Self, Self::Error> {
        let cinema = Cinema {
            id: row.booking.cinema_id,
            name: row.c_name,
            location: row.c_location,
            city: row.c_city,
            address: row.c_address,
            total_seats: row.c_total_seats,
            image_url: row.c_image_url,
            created_at: row.c_created_at,
            updated_at: row.c_updated_at,
        };
        let seat = Seat {
            id: row.booking.seat_id,
            cinema_id: row.s_cinema_id,
            seat_number: row.s_seat_number,
            row_number: row.s_row_number,
            seat_type: row.s_seat_type.parse()?,
            price: row.s_price,
            created_at: row.s_created_at,
            updated_at: row.s_updated_at,
        };
        Ok(BookingDetails { booking: row.booking.try_into()?, cinema, seat })
    }
}

#[derive(FromRow)]
struct PaymentRow {
    id: i64,
    booking_id: i64,
    user_id: i64,
    amount: f64,
    payment_method: String,
    status: String,
    transaction_id: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<PaymentRow> for Payment {
    type Error = StoreError;

    fn try_from(row: PaymentRow) -> Result<Self, Self::Error> {
        Ok(Payment {
            id: row.id,
            booking_id: row.booking_id,
            user_id: row.user_id,
            amount: row.amount,
            payment_method: row.payment_method,
            status: row.status.parse()?,
            transaction_id: row.transaction_id,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

/* ---------- catalog ---------- */

#[async_trait]
impl CatalogStore for PgStore {
    async fn get_cinema(&self, id: i64) -> StoreResult<Option<Cinema>> {
        let sql = format!("SELECT {CINEMA_COLUMNS} FROM cinemas WHERE id = $1");
        Ok(sqlx::query_as::<_, Cinema>(&sql).bind(id).fetch_optional(&self.pool).await?)
    }

    async fn get_seat(&self, id: i64) -> StoreResult<Option<Seat>> {
        let sql = format!("SELECT {SEAT_COLUMNS} FROM seats WHERE id = $1");
        sqlx::query_as::<_, SeatRow>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .map(Seat::try_from)
            .transpose()
    }

    async fn list_cinemas(&self, filter: &CinemaFilter, page: PageRequest) -> StoreResult<(Vec<Cinema>, i64)> {
        let city = CinemaFilter::pattern(&filter.city);
        let name = CinemaFilter::pattern(&filter.name);
        const WHERE: &str = "($1::TEXT IS NULL OR city ILIKE $1) AND ($2::TEXT IS NULL OR name ILIKE $2)";

        let total: i64 = sqlx::query_scalar(&format!("SELECT COUNT(*) FROM cinemas WHERE {WHERE}"))
            .bind(&city)
            .bind(&name)
            .fetch_one(&self.pool)
            .await?;

        let sql = format!("SELECT {CINEMA_COLUMNS} FROM cinemas WHERE {WHERE} ORDER BY name, id LIMIT $3 OFFSET $4");
        let cinemas = sqlx::query_as::<_, Cinema>(&sql)
            .bind(&city)
            .bind(&name)
            .bind(page.limit)
            .bind(page.offset())
            .fetch_all(&self.pool)
            .await?;

        Ok((cinemas, total))
    }

    async fn create_cinema(&self, cinema: NewCinema) -> StoreResult<Cinema> {
        let sql = format!(
            "INSERT INTO cinemas (name, location, city, address, total_seats, image_url)
             VALUES ($1, $2, $3, $4, $5, $6)
             RETURNING {CINEMA_COLUMNS}"
        );
        Ok(sqlx::query_as::<_, Cinema>(&sql)
            .bind(&cinema.name)
            .bind(&cinema.location)
            .bind(&cinema.city)
            .bind(&cinema.address)
            .bind(cinema.total_seats)
            .bind(&cinema.image_url)
            .fetch_one(&self.pool)
            .await?)
    }

    async fn create_seat(&self, seat: NewSeat) -> StoreResult<Seat> {
        let sql = format!(
            "INSERT INTO seats (cinema_id, seat_number, row_number, seat_type, price)
             VALUES ($1, $2, $3, $4, $5)
             RETURNING {SEAT_COLUMNS}"
        );
        let row = sqlx::query_as::<_, SeatRow>(&sql)
            .bind(seat.cinema_id)
            .bind(&seat.seat_number)
            .bind(seat.row_number)
            .bind(seat.seat_type.as_str())
            .bind(seat.price)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| match unique_violation(&e) {
                Some(_) => StoreError::Duplicate("seat"),
                None => StoreError::Database(e),
            })?;
        row.try_into()
    }
}

/* ---------- availability ---------- */

#[async_trait]
impl AvailabilityStore for PgStore {
    async fn get_availability(
        &self,
        cinema_id: i64,
        date: NaiveDate,
        time: &str,
    ) -> StoreResult<Vec<SeatAvailability>> {
        sqlx::query_as::<_, AvailabilityRow>(
            r#"
            SELECT sa.id, sa.cinema_id, sa.seat_id, sa.show_date, sa.show_time, sa.is_available,
                   sa.created_at, sa.updated_at,
                   s.seat_number, s.row_number, s.seat_type, s.price::FLOAT8 AS price,
                   s.created_at AS seat_created_at, s.updated_at AS seat_updated_at
            FROM seat_availability sa
            JOIN seats s ON s.id = sa.seat_id
            WHERE sa.cinema_id = $1 AND sa.show_date = $2 AND sa.show_time = $3
            ORDER BY s.row_number, s.seat_number
            "#,
        )
        .bind(cinema_id)
        .bind(date)
        .bind(time)
        .fetch_all(&self.pool)
        .await?
        .into_iter()
        .map(SeatAvailability::try_from)
        .collect()
    }

    async fn set_availability(&self, seat: &Seat, date: NaiveDate, time: &str, available: bool) -> StoreResult<()> {
        sqlx::query(
            r#"
            INSERT INTO seat_availability (cinema_id, seat_id, show_date, show_time, is_available)
            VALUES ($1, $2, $3, $4, $5)
            ON CONFLICT (seat_id, show_date, show_time)
            DO UPDATE SET is_available = EXCLUDED.is_available, updated_at = NOW()
            "#,
        )
        .bind(seat.cinema_id)
        .bind(seat.id)
        .bind(date)
        .bind(time)
        .bind(available)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn open_showing(&self, cinema_id: i64, date: NaiveDate, time: &str) -> StoreResult<u64> {
        let result = sqlx::query(
            r#"
            INSERT INTO seat_availability (cinema_id, seat_id, show_date, show_time, is_available)
            SELECT cinema_id, id, $2, $3, TRUE FROM seats WHERE cinema_id = $1
            ON CONFLICT (seat_id, show_date, show_time) DO NOTHING
            "#,
        )
        .bind(cinema_id)
        .bind(date)
        .bind(time)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected())
    }
}

/* ---------- ledger ---------- */

#[async_trait]
impl BookingLedger for PgStore {
    async fn is_seat_booked(&self, seat_id: i64, date: NaiveDate, time: &str) -> StoreResult<bool> {
        Ok(sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(
                SELECT 1 FROM bookings
                WHERE seat_id = $1 AND show_date = $2 AND show_time = $3 AND status <> 'cancelled'
            )",
        )
        .bind(seat_id)
        .bind(date)
        .bind(time)
        .fetch_one(&self.pool)
        .await?)
    }

    async fn reserve_seat(&self, booking: NewBooking) -> StoreResult<Booking> {
        // Dropping `tx` on any early return rolls everything back.
        let mut tx = self.pool.begin().await?;

        // Row lock serializes concurrent reservations of the same showing.
        let offered: Option<bool> = sqlx::query_scalar(
            "SELECT is_available FROM seat_availability
             WHERE seat_id = $1 AND show_date = $2 AND show_time = $3
             FOR UPDATE",
        )
        .bind(booking.seat_id)
        .bind(booking.show_date)
        .bind(&booking.show_time)
        .fetch_optional(&mut *tx)
        .await?;
        if offered.is_none() {
            return Err(StoreError::ShowingNotOffered);
        }

        let taken: bool = sqlx::query_scalar(
            "SELECT EXISTS(
                SELECT 1 FROM bookings
                WHERE seat_id = $1 AND show_date = $2 AND show_time = $3 AND status <> 'cancelled'
            )",
        )
        .bind(booking.seat_id)
        .bind(booking.show_date)
        .bind(&booking.show_time)
        .fetch_one(&mut *tx)
        .await?;
        if taken {
            return Err(StoreError::SeatTaken);
        }

        let sql = format!(
            "INSERT INTO bookings
                (user_id, cinema_id, seat_id, show_date, show_time, status, total_price, payment_method, payment_status)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
             RETURNING {BOOKING_COLUMNS}"
        );
        let row = sqlx::query_as::<_, BookingRow>(&sql)
            .bind(booking.user_id)
            .bind(booking.cinema_id)
            .bind(booking.seat_id)
            .bind(booking.show_date)
            .bind(&booking.show_time)
            .bind(BookingStatus::Pending.as_str())
            .bind(booking.total_price)
            .bind(&booking.payment_method)
            .bind(PaymentStatus::Pending.as_str())
            .fetch_one(&mut *tx)
            .await
            .map_err(|e| match unique_violation(&e) {
                // The partial unique index caught a writer that slipped past the check.
                Some(_) => StoreError::SeatTaken,
                None => StoreError::Database(e),
            })?;

        sqlx::query(
            "UPDATE seat_availability SET is_available = FALSE, updated_at = NOW()
             WHERE seat_id = $1 AND show_date = $2 AND show_time = $3",
        )
        .bind(booking.seat_id)
        .bind(booking.show_date)
        .bind(&booking.show_time)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        debug!(booking_id = row.id, seat_id = booking.seat_id, "seat reserved");
        row.try_into()
    }

    async fn get_booking(&self, id: i64) -> StoreResult<Option<Booking>> {
        let sql = format!("SELECT {BOOKING_COLUMNS} FROM bookings WHERE id = $1");
        sqlx::query_as::<_, BookingRow>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .map(Booking::try_from)
            .transpose()
    }

    async fn get_booking_details(&self, id: i64) -> StoreResult<Option<BookingDetails>> {
        let sql = format!("{DETAILS_SELECT} WHERE b.id = $1");
        sqlx::query_as::<_, BookingDetailsRow>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .map(BookingDetails::try_from)
            .transpose()
    }

    async fn user_bookings(&self, user_id: i64, page: PageRequest) -> StoreResult<(Vec<BookingDetails>, i64)> {
        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM bookings WHERE user_id = $1")
            .bind(user_id)
            .fetch_one(&self.pool)
            .await?;

        let sql = format!("{DETAILS_SELECT} WHERE b.user_id = $1 ORDER BY b.booking_date DESC, b.id DESC LIMIT $2 OFFSET $3");
        let bookings = sqlx::query_as::<_, BookingDetailsRow>(&sql)
            .bind(user_id)
            .bind(page.limit)
            .bind(page.offset())
            .fetch_all(&self.pool)
            .await?
            .into_iter()
            .map(BookingDetails::try_from)
            .collect::<StoreResult<Vec<_>>>()?;

        Ok((bookings, total))
    }
}

/* ---------- payments ---------- */

#[async_trait]
impl PaymentStore for PgStore {
    async fn payment_methods(&self) -> StoreResult<Vec<PaymentMethod>> {
        let sql = format!("SELECT {METHOD_COLUMNS} FROM payment_methods WHERE is_active = TRUE ORDER BY name");
        Ok(sqlx::query_as::<_, PaymentMethod>(&sql).fetch_all(&self.pool).await?)
    }

    async fn payment_method_by_name(&self, name: &str) -> StoreResult<Option<PaymentMethod>> {
        let sql = format!("SELECT {METHOD_COLUMNS} FROM payment_methods WHERE name = $1 AND is_active = TRUE");
        Ok(sqlx::query_as::<_, PaymentMethod>(&sql).bind(name).fetch_optional(&self.pool).await?)
    }

    async fn create_payment_method(&self, name: &str, method_type: &str) -> StoreResult<PaymentMethod> {
        let sql = format!("INSERT INTO payment_methods (name, type) VALUES ($1, $2) RETURNING {METHOD_COLUMNS}");
        sqlx::query_as::<_, PaymentMethod>(&sql)
            .bind(name)
            .bind(method_type)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| match unique_violation(&e) {
                Some(_) => StoreError::Duplicate("payment method"),
                None => StoreError::Database(e),
            })
    }

    async fn settle_payment(&self, payment: NewPayment) -> StoreResult<Payment> {
        let mut tx = self.pool.begin().await?;

        let sql = format!(
            "INSERT INTO payments (booking_id, user_id, amount, payment_method, status, transaction_id)
             VALUES ($1, $2, $3, $4, $5, $6)
             RETURNING {PAYMENT_COLUMNS}"
        );
        let row = sqlx::query_as::<_, PaymentRow>(&sql)
            .bind(payment.booking_id)
            .bind(payment.user_id)
            .bind(payment.amount)
            .bind(&payment.payment_method)
            .bind(payment.status.as_str())
            .bind(&payment.transaction_id)
            .fetch_one(&mut *tx)
            .await?;

        let updated = sqlx::query(
            "UPDATE bookings SET payment_status = $2, status = $3, updated_at = NOW() WHERE id = $1",
        )
        .bind(payment.booking_id)
        .bind(PaymentStatus::Paid.as_str())
        .bind(BookingStatus::Confirmed.as_str())
        .execute(&mut *tx)
        .await?
        .rows_affected();
        if updated == 0 {
            return Err(StoreError::Database(sqlx::Error::RowNotFound));
        }

        tx.commit().await?;
        row.try_into()
    }

    async fn payment_by_booking(&self, booking_id: i64) -> StoreResult<Option<Payment>> {
        let sql =
            format!("SELECT {PAYMENT_COLUMNS} FROM payments WHERE booking_id = $1 ORDER BY created_at DESC, id DESC LIMIT 1");
        sqlx::query_as::<_, PaymentRow>(&sql)
            .bind(booking_id)
            .fetch_optional(&self.pool)
            .await?
            .map(Payment::try_from)
            .transpose()
    }
}

/* ---------- users ---------- */

#[async_trait]
impl UserStore for PgStore {
    async fn create_user(&self, user: NewUser) -> StoreResult<User> {
        let sql = format!("INSERT INTO users (username, email, password) VALUES ($1, $2, $3) RETURNING {USER_COLUMNS}");
        sqlx::query_as::<_, User>(&sql)
            .bind(&user.username)
            .bind(&user.email)
            .bind(&user.password_hash)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| match unique_violation(&e) {
                Some(Some(constraint)) if constraint.contains("email") => StoreError::Duplicate("email"),
                Some(_) => StoreError::Duplicate("username"),
                None => StoreError::Database(e),
            })
    }

    async fn user_by_id(&self, id: i64) -> StoreResult<Option<User>> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE id = $1");
        Ok(sqlx::query_as::<_, User>(&sql).bind(id).fetch_optional(&self.pool).await?)
    }

    async fn user_by_username(&self, username: &str) -> StoreResult<Option<User>> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE username = $1");
        Ok(sqlx::query_as::<_, User>(&sql).bind(username).fetch_optional(&self.pool).await?)
    }

    async fn user_by_email(&self, email: &str) -> StoreResult<Option<User>> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE email = $1");
        Ok(sqlx::query_as::<_, User>(&sql).bind(email).fetch_optional(&self.pool).await?)
    }

    async fn create_verification(&self, verification: NewVerification) -> StoreResult<EmailVerification> {
        let sql = format!(
            "INSERT INTO email_verifications (user_id, email, otp_code, expires_at, is_verified)
             VALUES ($1, $2, $3, $4, FALSE)
             RETURNING {VERIFICATION_COLUMNS}"
        );
        Ok(sqlx::query_as::<_, EmailVerification>(&sql)
            .bind(verification.user_id)
            .bind(&verification.email)
            .bind(&verification.otp_code)
            .bind(verification.expires_at)
            .fetch_one(&self.pool)
            .await?)
    }

    async fn latest_verification(&self, email: &str) -> StoreResult<Option<EmailVerification>> {
        let sql = format!(
            "SELECT {VERIFICATION_COLUMNS} FROM email_verifications
             WHERE email = $1 ORDER BY created_at DESC, id DESC LIMIT 1"
        );
        Ok(sqlx::query_as::<_, EmailVerification>(&sql).bind(email).fetch_optional(&self.pool).await?)
    }

    async fn confirm_verification(&self, verification_id: i64, user_id: i64) -> StoreResult<()> {
        let mut tx = self.pool.begin().await?;
        sqlx::query("UPDATE email_verifications SET is_verified = TRUE WHERE id = $1")
            .bind(verification_id)
            .execute(&mut *tx)
            .await?;
        sqlx::query("UPDATE users SET is_verified = TRUE, updated_at = NOW() WHERE id = $1")
            .bind(user_id)
            .execute(&mut *tx)
            .await?;
        tx.commit().await?;
        Ok(())
    }

    async fn delete_expired_verifications(&self, now: DateTime<Utc>) -> StoreResult<u64> {
        let result = sqlx::query("DELETE FROM email_verifications WHERE expires_at < $1 AND is_verified = FALSE")
            .bind(now)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }
}
