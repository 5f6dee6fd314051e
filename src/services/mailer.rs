//! HTTP mail API client.
//!
//! Messages are POSTed as JSON to the configured endpoint with an `x-api-key`
//! header. Every call goes through a [`CircuitBreaker`] so a dead mail provider
//! stops costing a request timeout per notification. With no endpoint configured
//! the mailer only logs what it would have sent.

use serde::Serialize;
use std::sync::{
    atomic::{AtomicU32, Ordering},
    Mutex, PoisonError,
};
use tokio::time::{Duration, Instant};
use tracing::{error, info, warn};

use crate::config::EmailConfig;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CircuitState {
    /// Requests flow normally.
    Closed,
    /// Requests are rejected until the cool-down elapses.
    Open,
    /// One trial request is let through.
    HalfOpen,
}

#[derive(Debug)]
struct BreakerInner {
    state: CircuitState,
    opened_at: Option<Instant>,
}

/// Consecutive-failure circuit breaker.
#[derive(Debug)]
pub struct CircuitBreaker {
    inner: Mutex<BreakerInner>,
    failure_count: AtomicU32,
    failure_threshold: u32,
    cool_down: Duration,
}

impl CircuitBreaker {
    pub fn new(failure_threshold: u32, cool_down: Duration) -> Self {
        Self {
            inner: Mutex::new(BreakerInner { state: CircuitState::Closed, opened_at: None }),
            failure_count: AtomicU32::new(0),
            failure_threshold: failure_threshold.max(1),
            cool_down,
        }
    }

    pub fn can_execute(&self) -> bool {
        let mut inner = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        match inner.state {
            CircuitState::Closed | CircuitState::HalfOpen => true,
            CircuitState::Open => {
                let cooled = inner.opened_at.map_or(true, |at| at.elapsed() >= self.cool_down);
                if cooled {
                    inner.state = CircuitState::HalfOpen;
                    info!("Mail circuit breaker half-open, allowing a trial request");
                }
                cooled
            }
        }
    }

    pub fn record_success(&self) {
        let mut inner = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        if inner.state == CircuitState::HalfOpen {
            info!("Mail circuit breaker closed again");
        }
        inner.state = CircuitState::Closed;
        inner.opened_at = None;
        self.failure_count.store(0, Ordering::Relaxed);
    }

    pub fn record_failure(&self) {
        let failures = self.failure_count.fetch_add(1, Ordering::Relaxed) + 1;
        let mut inner = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        match inner.state {
            CircuitState::Closed if failures >= self.failure_threshold => {
                inner.state = CircuitState::Open;
                inner.opened_at = Some(Instant::now());
                error!("Mail circuit breaker OPENED after {} consecutive failures", failures);
            }
            CircuitState::HalfOpen => {
                inner.state = CircuitState::Open;
                inner.opened_at = Some(Instant::now());
                warn!("Mail trial request failed, circuit breaker open again");
            }
            _ => {}
        }
    }

    pub fn state(&self) -> CircuitState {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner).state
    }
}

#[derive(Debug, thiserror::Error)]
pub enum MailError {
    #[error("mail API temporarily unavailable (circuit open)")]
    CircuitOpen,
    #[error("mail API request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("mail API answered with status {0}")]
    Status(u16),
}

#[derive(Debug, Serialize)]
struct MailRequest<'a> {
    to: &'a str,
    name: &'a str,
    subject: &'a str,
    text: &'a str,
}

pub struct Mailer {
    http_client: reqwest::Client,
    api_url: Option<String>,
    api_key: String,
    breaker: CircuitBreaker,
}

impl Mailer {
    pub fn from_config(config: &EmailConfig) -> Result<Self, MailError> {
        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            http_client,
            api_url: config.api_url.clone().filter(|url| !url.trim().is_empty()),
            api_key: config.api_key.clone(),
            breaker: CircuitBreaker::new(
                config.breaker_failure_threshold,
                Duration::from_secs(config.breaker_cool_down_secs),
            ),
        })
    }

    pub fn breaker_state(&self) -> CircuitState {
        self.breaker.state()
    }

    pub async fn send(&self, to: &str, name: &str, subject: &str, text: &str) -> Result<(), MailError> {
        let Some(url) = self.api_url.as_deref() else {
            info!(to, subject, "mail API not configured, message logged only");
            return Ok(());
        };

        if !self.breaker.can_execute() {
            warn!(to, "mail circuit breaker is open, skipping delivery");
            return Err(MailError::CircuitOpen);
        }

        let result = self
            .http_client
            .post(url)
            .header("x-api-key", &self.api_key)
            .json(&MailRequest { to, name, subject, text })
            .send()
            .await;

        match result {
            Ok(resp) if resp.status().is_success() => {
                self.breaker.record_success();
                Ok(())
            }
            Ok(resp) => {
                self.breaker.record_failure();
                Err(MailError::Status(resp.status().as_u16()))
            }
            Err(e) => {
                self.breaker.record_failure();
                Err(MailError::Http(e))
            }
        }
    }
}
