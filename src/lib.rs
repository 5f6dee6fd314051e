pub mod cache;
pub mod config;
pub mod controllers;
pub mod database;
pub mod error;
pub mod middleware;
pub mod models;
pub mod pagination;
pub mod redis_client;
pub mod seed;
pub mod services;
pub mod store;

use axum::{routing::get, Router};
use std::sync::Arc;
use std::time::Duration;
use tower_http::{cors::CorsLayer, timeout::TimeoutLayer, trace::TraceLayer};

use cache::SessionStore;
use services::{AuthService, BookingService, CinemaService, Notifier, OtpService, PaymentService, SeatService};
use store::Storage;

// Shared state for every handler
pub struct AppState {
    pub config: config::Config,
    pub auth: AuthService,
    pub otp: OtpService,
    pub cinemas: CinemaService,
    pub seats: SeatService,
    pub bookings: BookingService,
    pub payments: PaymentService,
}

impl AppState {
    pub fn new(
        config: config::Config,
        store: Arc<dyn Storage>,
        sessions: Arc<dyn SessionStore>,
        notifier: Notifier,
    ) -> Arc<Self> {
        let otp = OtpService::new(store.clone(), notifier.clone());
        Arc::new(Self {
            auth: AuthService::new(store.clone(), sessions, otp.clone(), config.jwt.clone()),
            otp,
            cinemas: CinemaService::new(store.clone()),
            seats: SeatService::new(store.clone()),
            bookings: BookingService::new(store.clone(), notifier.clone()),
            payments: PaymentService::new(store, notifier),
            config,
        })
    }
}

/// The full HTTP application. Every request is bounded by the configured timeout;
/// a timed-out request is dropped, which rolls back any open storage transaction.
pub fn app(state: Arc<AppState>) -> Router {
    let timeout = Duration::from_secs(state.config.app.request_timeout_secs.max(1));

    Router::new()
        .route("/", get(|| async { "Cinema Booking API v1.0" }))
        .route("/health", get(|| async { "OK" }))
        .nest("/api", controllers::routes())
        .with_state(state)
        .layer(TimeoutLayer::new(timeout))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}
