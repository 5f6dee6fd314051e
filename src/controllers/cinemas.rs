use axum::{
    extract::{Path, Query, State},
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use serde::Deserialize;
use std::sync::Arc;

use crate::error::AppError;
use crate::models::CinemaFilter;
use crate::pagination::PageRequest;
use crate::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/cinemas", get(list_cinemas))
        .route("/cinemas/{id}", get(get_cinema))
        .route("/cinemas/{id}/seats", get(get_seat_availability))
}

#[derive(Debug, Deserialize)]
struct CinemaListQuery {
    page: Option<i64>,
    limit: Option<i64>,
    city: Option<String>,
    name: Option<String>,
}

// GET /api/cinemas?page&limit&city&name
async fn list_cinemas(
    State(state): State<Arc<AppState>>,
    Query(q): Query<CinemaListQuery>,
) -> Result<impl IntoResponse, AppError> {
    let filter = CinemaFilter { city: q.city, name: q.name };
    let page = PageRequest::new(q.page, q.limit);
    Ok(Json(state.cinemas.list_cinemas(&filter, page).await?))
}

// GET /api/cinemas/{id}
async fn get_cinema(State(state): State<Arc<AppState>>, Path(id): Path<i64>) -> Result<impl IntoResponse, AppError> {
    Ok(Json(state.cinemas.get_cinema(id).await?))
}

#[derive(Debug, Deserialize)]
struct ShowingQuery {
    date: String,
    time: String,
}

// GET /api/cinemas/{id}/seats?date=YYYY-MM-DD&time=HH:MM
async fn get_seat_availability(
    State(state): State<Arc<AppState>>,
    Path(cinema_id): Path<i64>,
    Query(q): Query<ShowingQuery>,
) -> Result<impl IntoResponse, AppError> {
    Ok(Json(state.seats.get_seat_availability(cinema_id, &q.date, &q.time).await?))
}
