#![allow(dead_code)]

use chrono::NaiveDate;
use std::sync::Arc;
use tokio::sync::mpsc;

use cinema_booking::{
    cache::MemorySessionStore,
    config::Config,
    models::{Cinema, NewCinema, NewSeat, Seat, SeatType},
    services::{Notification, Notifier},
    store::{AvailabilityStore, CatalogStore, MemoryStore, PaymentStore},
    AppState,
};

pub const SHOW_TIME: &str = "19:00";

pub fn show_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 1, 15).unwrap()
}

pub fn test_config() -> Config {
    let mut config = Config::default();
    config.jwt.secret = "test-secret".to_string();
    config.jwt.bcrypt_cost = 4;
    config
}

pub struct Harness {
    pub state: Arc<AppState>,
    pub store: Arc<MemoryStore>,
    pub notifications: mpsc::Receiver<Notification>,
}

pub async fn harness() -> Harness {
    let store = Arc::new(MemoryStore::new());
    for (name, kind) in [("cash", "cash"), ("credit_card", "credit_card")] {
        store.create_payment_method(name, kind).await.unwrap();
    }
    let (notifier, notifications) = Notifier::channel(256);
    let state = AppState::new(test_config(), store.clone(), Arc::new(MemorySessionStore::new()), notifier);
    Harness { state, store, notifications }
}

pub async fn cinema(store: &MemoryStore, name: &str) -> Cinema {
    store
        .create_cinema(NewCinema {
            name: name.to_string(),
            location: "Mall".to_string(),
            city: "Jakarta".to_string(),
            address: "Jl. Sudirman 1".to_string(),
            total_seats: 150,
            image_url: String::new(),
        })
        .await
        .unwrap()
}

pub async fn seat(store: &MemoryStore, cinema: &Cinema, label: &str, price: f64) -> Seat {
    store
        .create_seat(NewSeat {
            cinema_id: cinema.id,
            seat_number: label.to_string(),
            row_number: 3,
            seat_type: SeatType::Premium,
            price,
        })
        .await
        .unwrap()
}

/// A cinema with one seat at `price`, offered for the standard test showing.
pub async fn offered_seat(store: &MemoryStore, price: f64) -> (Cinema, Seat) {
    let cinema = cinema(store, "CGV Cinemas - Jakarta").await;
    let seat = seat(store, &cinema, "3C", price).await;
    store.set_availability(&seat, show_date(), SHOW_TIME, true).await.unwrap();
    (cinema, seat)
}
