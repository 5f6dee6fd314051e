//! Payment workflow.
//!
//! There is no external gateway: a payment that passes validation is recorded as
//! successful immediately, and its booking becomes confirmed and paid in the same
//! storage transaction.

use std::sync::Arc;
use tracing::info;
use validator::Validate;

use super::notifier::{Notification, Notifier};
use crate::error::{AppError, AppResult, StoreContext};
use crate::models::{NewPayment, PaymentMethod, PaymentRequest, PaymentSnapshot, TransactionStatus};
use crate::store::{BookingLedger, PaymentStore, Storage};

pub fn transaction_id(booking_id: i64, user_id: i64) -> String {
    format!("TXN-{booking_id}-{user_id}")
}

#[derive(Clone)]
pub struct PaymentService {
    store: Arc<dyn Storage>,
    notifier: Notifier,
}

impl PaymentService {
    pub fn new(store: Arc<dyn Storage>, notifier: Notifier) -> Self {
        Self { store, notifier }
    }

    pub async fn process_payment(&self, user_id: i64, req: PaymentRequest) -> AppResult<PaymentSnapshot> {
        let booking = self
            .store
            .get_booking(req.booking_id)
            .await
            .context("load booking")?
            .ok_or(AppError::NotFound("booking"))?;
        if booking.user_id != user_id {
            return Err(AppError::Unauthorized("booking belongs to another user".into()));
        }
        // Exact comparison: the amount must be the captured price, not an approximation.
        if req.amount != booking.total_price {
            return Err(AppError::invalid("amount mismatch"));
        }
        req.validate()?;

        let method = self
            .store
            .payment_method_by_name(&req.payment_method)
            .await
            .context("load payment method")?
            .ok_or_else(|| AppError::invalid("invalid payment method"))?;

        let payment = self
            .store
            .settle_payment(NewPayment {
                booking_id: booking.id,
                user_id,
                amount: req.amount,
                payment_method: method.name,
                status: TransactionStatus::Success,
                transaction_id: transaction_id(booking.id, user_id),
            })
            .await
            .context("settle payment")?;

        info!(booking_id = booking.id, user_id, transaction_id = %payment.transaction_id, "payment processed");
        let snapshot = PaymentSnapshot::from(&payment);
        self.notifier.notify(Notification::PaymentConfirmed { user_id, payment: snapshot.clone() });
        Ok(snapshot)
    }

    pub async fn get_payment_methods(&self) -> AppResult<Vec<PaymentMethod>> {
        self.store.payment_methods().await.context("list payment methods")
    }
}
