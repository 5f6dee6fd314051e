pub mod auth;
pub mod booking;
pub mod cinema;
pub mod cleanup;
pub mod mailer;
pub mod notifier;
pub mod otp;
pub mod payment;
pub mod seats;

pub use auth::AuthService;
pub use booking::BookingService;
pub use cinema::CinemaService;
pub use cleanup::CleanupService;
pub use mailer::Mailer;
pub use notifier::{Notification, Notifier};
pub use otp::OtpService;
pub use payment::PaymentService;
pub use seats::SeatService;

use chrono::NaiveDate;

use crate::error::{AppError, AppResult};

/// Showing dates are calendar dates in `YYYY-MM-DD` form.
pub(crate) fn parse_show_date(raw: &str) -> AppResult<NaiveDate> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .map_err(|_| AppError::invalid(format!("invalid date '{raw}', expected YYYY-MM-DD")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn show_dates() {
        assert_eq!(parse_show_date("2026-01-15").unwrap(), NaiveDate::from_ymd_opt(2026, 1, 15).unwrap());
        assert!(parse_show_date("15/01/2026").is_err());
        assert!(parse_show_date("2026-02-30").is_err());
        assert!(parse_show_date("").is_err());
    }
}
