use std::sync::Arc;

use super::parse_show_date;
use crate::error::{AppResult, StoreContext};
use crate::models::SeatAvailabilityReport;
use crate::store::{AvailabilityStore, Storage};

#[derive(Clone)]
pub struct SeatService {
    store: Arc<dyn Storage>,
}

impl SeatService {
    pub fn new(store: Arc<dyn Storage>) -> Self {
        Self { store }
    }

    /// Seat map of one showing, split into free and taken seats. A showing that was
    /// never offered yields an empty report.
    pub async fn get_seat_availability(&self, cinema_id: i64, date: &str, time: &str) -> AppResult<SeatAvailabilityReport> {
        let show_date = parse_show_date(date)?;
        let rows = self
            .store
            .get_availability(cinema_id, show_date, time)
            .await
            .context("load seat availability")?;
        Ok(SeatAvailabilityReport::partition(cinema_id, date, time, rows))
    }
}
