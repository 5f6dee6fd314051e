use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};

use super::UnknownVariant;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SeatType {
    Standard,
    Premium,
    Vip,
}

impl SeatType {
    pub fn as_str(&self) -> &'static str {
        match self {
            SeatType::Standard => "standard",
            SeatType::Premium => "premium",
            SeatType::Vip => "vip",
        }
    }
}

impl FromStr for SeatType {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "standard" => Ok(SeatType::Standard),
            "premium" => Ok(SeatType::Premium),
            "vip" => Ok(SeatType::Vip),
            other => Err(UnknownVariant::new("seat type", other)),
        }
    }
}

impl fmt::Display for SeatType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A physical seat. Price is fixed at creation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Seat {
    pub id: i64,
    pub cinema_id: i64,
    pub seat_number: String,
    pub row_number: i32,
    pub seat_type: SeatType,
    pub price: f64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewSeat {
    pub cinema_id: i64,
    pub seat_number: String,
    pub row_number: i32,
    pub seat_type: SeatType,
    pub price: f64,
}

/// Per-showing state of one seat. Rows only exist for offered showtimes.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SeatAvailability {
    pub id: i64,
    pub cinema_id: i64,
    pub seat_id: i64,
    pub show_date: NaiveDate,
    pub show_time: String,
    pub is_available: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub seat: Seat,
}

#[derive(Debug, Clone, Serialize)]
pub struct SeatAvailabilityReport {
    pub cinema_id: i64,
    pub date: String,
    pub time: String,
    pub available_seats: Vec<SeatAvailability>,
    pub unavailable_seats: Vec<SeatAvailability>,
    pub total_available: usize,
    pub total_unavailable: usize,
}

impl SeatAvailabilityReport {
    pub fn partition(cinema_id: i64, date: &str, time: &str, rows: Vec<SeatAvailability>) -> Self {
        let (available_seats, unavailable_seats): (Vec<_>, Vec<_>) =
            rows.into_iter().partition(|row| row.is_available);

        Self {
            cinema_id,
            date: date.to_string(),
            time: time.to_string(),
            total_available: available_seats.len(),
            total_unavailable: unavailable_seats.len(),
            available_seats,
            unavailable_seats,
        }
    }
}
