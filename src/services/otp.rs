use chrono::{Duration, Utc};
use std::sync::Arc;
use tracing::info;
use uuid::Uuid;
use validator::Validate;

use super::notifier::{Notification, Notifier};
use crate::error::{AppError, AppResult, StoreContext};
use crate::models::{NewVerification, ResendOtpRequest, User, VerifyOtpRequest};
use crate::store::{Storage, UserStore};

/// How long an issued code stays valid.
pub const OTP_TTL_MINUTES: i64 = 5;
/// Minimum age of the latest code before another may be requested.
pub const RESEND_COOLDOWN_MINUTES: i64 = 1;

/// Six decimal digits, zero padded.
pub fn generate_code() -> String {
    format!("{:06}", Uuid::new_v4().as_u128() % 1_000_000)
}

#[derive(Clone)]
pub struct OtpService {
    store: Arc<dyn Storage>,
    notifier: Notifier,
}

impl OtpService {
    pub fn new(store: Arc<dyn Storage>, notifier: Notifier) -> Self {
        Self { store, notifier }
    }

    /// Stores a fresh code for the user and queues it for delivery.
    pub async fn issue(&self, user: &User) -> AppResult<()> {
        let code = generate_code();
        self.store
            .create_verification(NewVerification {
                user_id: user.id,
                email: user.email.clone(),
                otp_code: code.clone(),
                expires_at: Utc::now() + Duration::minutes(OTP_TTL_MINUTES),
            })
            .await
            .context("save verification code")?;

        self.notifier.notify(Notification::OtpIssued {
            email: user.email.clone(),
            username: user.username.clone(),
            code,
        });
        Ok(())
    }

    pub async fn verify_email(&self, req: VerifyOtpRequest) -> AppResult<()> {
        req.validate()?;
        let record = self
            .store
            .latest_verification(&req.email)
            .await
            .context("load verification code")?
            .ok_or(AppError::NotFound("verification"))?;

        if record.is_verified {
            return Err(AppError::invalid("email already verified"));
        }
        if Utc::now() > record.expires_at {
            return Err(AppError::invalid("verification code has expired, please request a new one"));
        }
        if record.otp_code != req.otp_code {
            return Err(AppError::invalid("invalid verification code"));
        }

        self.store
            .confirm_verification(record.id, record.user_id)
            .await
            .context("confirm verification")?;
        info!(user_id = record.user_id, "email verified");
        Ok(())
    }

    pub async fn resend_otp(&self, req: ResendOtpRequest) -> AppResult<()> {
        req.validate()?;
        let record = self
            .store
            .latest_verification(&req.email)
            .await
            .context("load verification code")?
            .ok_or(AppError::NotFound("verification"))?;

        if record.is_verified {
            return Err(AppError::invalid("email already verified"));
        }
        if Utc::now() - record.created_at < Duration::minutes(RESEND_COOLDOWN_MINUTES) {
            return Err(AppError::invalid("please wait 1 minute before requesting a new code"));
        }

        let user = self
            .store
            .user_by_id(record.user_id)
            .await
            .context("load user")?
            .ok_or(AppError::NotFound("user"))?;
        self.issue(&user).await
    }
}
