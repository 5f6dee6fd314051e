pub mod booking;
pub mod cinema;
pub mod payment;
pub mod seat;
pub mod user;

pub use booking::{Booking, BookingDetails, BookingSnapshot, BookingStatus, CreateBookingRequest, NewBooking, PaymentStatus};
pub use cinema::{Cinema, CinemaFilter, NewCinema};
pub use payment::{NewPayment, Payment, PaymentMethod, PaymentRequest, PaymentSnapshot, TransactionStatus};
pub use seat::{NewSeat, Seat, SeatAvailability, SeatAvailabilityReport, SeatType};
pub use user::{
    EmailVerification, LoginRequest, LoginResponse, NewUser, NewVerification, RegisterRequest, ResendOtpRequest,
    User, UserProfile, VerifyOtpRequest,
};

/// A stored string column did not match any known variant.
#[derive(Debug, thiserror::Error)]
#[error("unknown {kind} '{value}'")]
pub struct UnknownVariant {
    pub kind: &'static str,
    pub value: String,
}

impl UnknownVariant {
    pub(crate) fn new(kind: &'static str, value: &str) -> Self {
        Self { kind, value: value.to_string() }
    }
}
