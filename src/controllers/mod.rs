pub mod bookings;
pub mod cinemas;
pub mod payment;
pub mod users;

use axum::Router;
use std::sync::Arc;

pub fn routes() -> Router<Arc<crate::AppState>> {
    Router::new()
        .merge(users::routes())
        .merge(cinemas::routes())
        .merge(bookings::routes())
        .merge(payment::routes())
}
