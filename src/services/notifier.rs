//! Fire-and-forget notifications.
//!
//! Workflows hand a [`Notification`] to the [`Notifier`], which pushes it onto a
//! bounded queue without waiting. A single background worker drains the queue:
//! OTP codes go out through the [`Mailer`], booking and payment events are logged.
//! A full or closed queue drops the message with a warning; the caller's result is
//! never affected.

use serde::Serialize;
use tokio::{
    sync::mpsc::{self, error::TrySendError},
    task::JoinHandle,
};
use tracing::{debug, error, info, warn};

use super::mailer::Mailer;
use crate::models::{BookingSnapshot, PaymentSnapshot};

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Notification {
    BookingCreated { user_id: i64, booking: BookingSnapshot },
    PaymentConfirmed { user_id: i64, payment: PaymentSnapshot },
    OtpIssued { email: String, username: String, code: String },
}

impl Notification {
    pub fn kind(&self) -> &'static str {
        match self {
            Notification::BookingCreated { .. } => "booking_created",
            Notification::PaymentConfirmed { .. } => "payment_confirmed",
            Notification::OtpIssued { .. } => "otp_issued",
        }
    }
}

#[derive(Clone)]
pub struct Notifier {
    tx: mpsc::Sender<Notification>,
}

impl Notifier {
    /// Notifier plus the raw receiving end, for callers that drain it themselves.
    pub fn channel(capacity: usize) -> (Self, mpsc::Receiver<Notification>) {
        let (tx, rx) = mpsc::channel(capacity.max(1));
        (Self { tx }, rx)
    }

    /// Starts the delivery worker. It exits once every `Notifier` clone is dropped
    /// and the queue is drained.
    pub fn spawn(mailer: Mailer, capacity: usize) -> (Self, JoinHandle<()>) {
        let (notifier, mut rx) = Self::channel(capacity);
        let handle = tokio::spawn(async move {
            while let Some(notification) = rx.recv().await {
                deliver(&mailer, notification).await;
            }
            debug!("notification queue closed, worker exiting");
        });
        (notifier, handle)
    }

    pub fn notify(&self, notification: Notification) {
        match self.tx.try_send(notification) {
            Ok(()) => {}
            Err(TrySendError::Full(n)) => warn!(kind = n.kind(), "notification queue full, dropping"),
            Err(TrySendError::Closed(n)) => warn!(kind = n.kind(), "notification queue closed, dropping"),
        }
    }
}

async fn deliver(mailer: &Mailer, notification: Notification) {
    match &notification {
        Notification::OtpIssued { email, username, code } => {
            let text = format!(
                "Hello {username},\n\nYour verification code is {code}. It expires in 5 minutes.\n"
            );
            match mailer.send(email, username, "Your verification code", &text).await {
                Ok(()) => info!(email = %email, "verification code sent"),
                Err(e) => error!(email = %email, "failed to send verification code: {}", e),
            }
        }
        Notification::BookingCreated { user_id, booking } => {
            info!(
                user_id,
                booking_id = booking.id,
                seat_id = booking.seat_id,
                show_date = %booking.show_date,
                show_time = %booking.show_time,
                "booking confirmation sent"
            );
        }
        Notification::PaymentConfirmed { user_id, payment } => {
            info!(
                user_id,
                booking_id = payment.booking_id,
                transaction_id = %payment.transaction_id,
                amount = payment.amount,
                "payment confirmation sent"
            );
        }
    }
}
