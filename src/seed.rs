//! Demo catalog: cinemas, their seat layout, payment methods and a rolling window
//! of showings. Safe to run repeatedly; existing rows are left alone and only
//! missing showings are added.

use chrono::{Duration, NaiveDate};
use tracing::info;

use crate::models::{CinemaFilter, NewCinema, NewSeat, SeatType};
use crate::pagination::{PageRequest, MAX_PAGE_SIZE};
use crate::store::{AvailabilityStore, CatalogStore, PaymentStore, Storage, StoreError, StoreResult};

pub const ROWS: i32 = 5;
pub const SEATS_PER_ROW: u32 = 30;
pub const SHOW_TIMES: [&str; 5] = ["10:00", "13:00", "16:00", "19:00", "21:00"];
pub const SHOWING_DAYS: i64 = 10;

const PAYMENT_METHODS: [(&str, &str); 5] = [
    ("bank_transfer", "transfer"),
    ("cash", "cash"),
    ("credit_card", "credit_card"),
    ("debit_card", "debit_card"),
    ("e_wallet", "e_wallet"),
];

struct CinemaSeed {
    name: &'static str,
    location: &'static str,
    city: &'static str,
    address: &'static str,
}

const CINEMAS: [CinemaSeed; 5] = [
    CinemaSeed {
        name: "CGV Cinemas - Jakarta",
        location: "Blok M Plaza",
        city: "Jakarta",
        address: "Jl. Melawai No. 1, Blok M, Jakarta Selatan",
    },
    CinemaSeed {
        name: "Cinemaxx - Surabaya",
        location: "Pakuwon Indah",
        city: "Surabaya",
        address: "Jl. Raya Pakuwon Indah, Surabaya",
    },
    CinemaSeed {
        name: "Premiere Cinema - Bandung",
        location: "Bandung Indah Plaza",
        city: "Bandung",
        address: "Jl. Ir. H. Juanda No. 1, Bandung",
    },
    CinemaSeed {
        name: "TheScreen Cinemas - Medan",
        location: "Medan Fair",
        city: "Medan",
        address: "Jl. Jend. Gatot Subroto No. 1, Medan",
    },
    CinemaSeed {
        name: "Studio 21 - Bali",
        location: "Denpasar",
        city: "Bali",
        address: "Jl. Raya Puputan No. 1, Denpasar",
    },
];

/// Seat type and price by row: 1-2 standard, 3-4 premium, 5 vip.
pub fn row_class(row: i32) -> (SeatType, f64) {
    match row {
        3 | 4 => (SeatType::Premium, 70000.0),
        r if r >= 5 => (SeatType::Vip, 100000.0),
        _ => (SeatType::Standard, 50000.0),
    }
}

/// Column letters: 1 → A, 26 → Z, 27 → AA.
pub fn column_label(mut n: u32) -> String {
    let mut label = Vec::new();
    while n > 0 {
        n -= 1;
        label.push(b'A' + (n % 26) as u8);
        n /= 26;
    }
    label.reverse();
    String::from_utf8(label).unwrap_or_default()
}

pub fn seat_label(row: i32, column: u32) -> String {
    format!("{row}{}", column_label(column))
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SeedSummary {
    pub cinemas: usize,
    pub seats: usize,
    pub payment_methods: usize,
    pub showing_rows: u64,
}

pub async fn seed_catalog(store: &dyn Storage, today: NaiveDate) -> StoreResult<SeedSummary> {
    let mut summary = SeedSummary::default();

    for (name, method_type) in PAYMENT_METHODS {
        match store.create_payment_method(name, method_type).await {
            Ok(_) => summary.payment_methods += 1,
            Err(StoreError::Duplicate(_)) => {}
            Err(e) => return Err(e),
        }
    }

    let (existing, total) = store
        .list_cinemas(&CinemaFilter::default(), PageRequest::new(Some(1), Some(MAX_PAGE_SIZE)))
        .await?;
    let cinema_ids: Vec<i64> = if total > 0 {
        info!("Catalog already has {} cinemas, only extending showings", total);
        existing.iter().map(|c| c.id).collect()
    } else {
        let mut ids = Vec::with_capacity(CINEMAS.len());
        for seed in &CINEMAS {
            let cinema = store
                .create_cinema(NewCinema {
                    name: seed.name.to_string(),
                    location: seed.location.to_string(),
                    city: seed.city.to_string(),
                    address: seed.address.to_string(),
                    total_seats: ROWS * SEATS_PER_ROW as i32,
                    image_url: format!("https://via.placeholder.com/300x200?text={}", seed.city),
                })
                .await?;
            summary.cinemas += 1;

            for row in 1..=ROWS {
                let (seat_type, price) = row_class(row);
                for column in 1..=SEATS_PER_ROW {
                    store
                        .create_seat(NewSeat {
                            cinema_id: cinema.id,
                            seat_number: seat_label(row, column),
                            row_number: row,
                            seat_type,
                            price,
                        })
                        .await?;
                    summary.seats += 1;
                }
            }
            info!("Cinema created: {} (ID: {})", cinema.name, cinema.id);
            ids.push(cinema.id);
        }
        ids
    };

    for cinema_id in cinema_ids {
        for day in 0..SHOWING_DAYS {
            let date = today + Duration::days(day);
            for time in SHOW_TIMES {
                summary.showing_rows += store.open_showing(cinema_id, date, time).await?;
            }
        }
    }

    info!(
        cinemas = summary.cinemas,
        seats = summary.seats,
        payment_methods = summary.payment_methods,
        showing_rows = summary.showing_rows,
        "Seeding completed"
    );
    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;

    #[test]
    fn labels() {
        assert_eq!(seat_label(3, 3), "3C");
        assert_eq!(column_label(26), "Z");
        assert_eq!(column_label(27), "AA");
        assert_eq!(column_label(30), "AD");
    }

    #[test]
    fn pricing_by_row() {
        assert_eq!(row_class(1), (SeatType::Standard, 50000.0));
        assert_eq!(row_class(4), (SeatType::Premium, 70000.0));
        assert_eq!(row_class(5), (SeatType::Vip, 100000.0));
    }

    #[tokio::test]
    async fn seeding_twice_only_adds_missing_rows() {
        let store = MemoryStore::new();
        let today = NaiveDate::from_ymd_opt(2026, 1, 15).unwrap();

        let first = seed_catalog(&store, today).await.unwrap();
        assert_eq!(first.cinemas, 5);
        assert_eq!(first.seats, 5 * 150);
        assert_eq!(first.payment_methods, 5);
        assert_eq!(first.showing_rows, 5 * 150 * 10 * 5);

        let second = seed_catalog(&store, today).await.unwrap();
        assert_eq!(second, SeedSummary::default());

        let next_day = seed_catalog(&store, today + Duration::days(1)).await.unwrap();
        assert_eq!(next_day.showing_rows, 5 * 150 * 5);
    }
}
