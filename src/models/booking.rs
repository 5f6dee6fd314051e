use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use validator::Validate;

use super::{Cinema, Seat, UnknownVariant};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BookingStatus {
    Pending,
    Confirmed,
    Cancelled,
}

impl BookingStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            BookingStatus::Pending => "pending",
            BookingStatus::Confirmed => "confirmed",
            BookingStatus::Cancelled => "cancelled",
        }
    }

    /// Whether a booking in this state still holds its showing.
    pub fn holds_seat(&self) -> bool {
        !matches!(self, BookingStatus::Cancelled)
    }
}

impl FromStr for BookingStatus {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(BookingStatus::Pending),
            "confirmed" => Ok(BookingStatus::Confirmed),
            "cancelled" => Ok(BookingStatus::Cancelled),
            other => Err(UnknownVariant::new("booking status", other)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentStatus {
    Pending,
    Paid,
    Failed,
}

impl PaymentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentStatus::Pending => "pending",
            PaymentStatus::Paid => "paid",
            PaymentStatus::Failed => "failed",
        }
    }
}

impl FromStr for PaymentStatus {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(PaymentStatus::Pending),
            "paid" => Ok(PaymentStatus::Paid),
            "failed" => Ok(PaymentStatus::Failed),
            other => Err(UnknownVariant::new("payment status", other)),
        }
    }
}

/// One user's reservation of one seat for one showtime.
///
/// `total_price` is the seat price captured when the booking was made and is never
/// recomputed afterwards.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Booking {
    pub id: i64,
    pub user_id: i64,
    pub cinema_id: i64,
    pub seat_id: i64,
    pub show_date: NaiveDate,
    pub show_time: String,
    pub booking_date: DateTime<Utc>,
    pub status: BookingStatus,
    pub total_price: f64,
    pub payment_method: String,
    pub payment_status: PaymentStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Ledger insert. New bookings always start as pending/pending.
#[derive(Debug, Clone)]
pub struct NewBooking {
    pub user_id: i64,
    pub cinema_id: i64,
    pub seat_id: i64,
    pub show_date: NaiveDate,
    pub show_time: String,
    pub total_price: f64,
    pub payment_method: String,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateBookingRequest {
    pub cinema_id: i64,
    pub seat_id: i64,
    pub date: String,
    #[validate(length(min = 1, max = 10))]
    pub time: String,
    #[validate(length(min = 1, max = 50))]
    pub payment_method: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BookingSnapshot {
    pub id: i64,
    pub cinema_id: i64,
    pub seat_id: i64,
    pub show_date: NaiveDate,
    pub show_time: String,
    pub total_price: f64,
    pub payment_method: String,
    pub status: BookingStatus,
    pub payment_status: PaymentStatus,
    pub created_at: DateTime<Utc>,
}

impl From<&Booking> for BookingSnapshot {
    fn from(b: &Booking) -> Self {
        Self {
            id: b.id,
            cinema_id: b.cinema_id,
            seat_id: b.seat_id,
            show_date: b.show_date,
            show_time: b.show_time.clone(),
            total_price: b.total_price,
            payment_method: b.payment_method.clone(),
            status: b.status,
            payment_status: b.payment_status,
            created_at: b.created_at,
        }
    }
}

/// Booking joined with its cinema and seat, for history views.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BookingDetails {
    #[serde(flatten)]
    pub booking: Booking,
    pub cinema: Cinema,
    pub seat: Seat,
}
