use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use std::sync::Arc;

use crate::error::AppError;
use crate::middleware::{AuthUser, JsonBody};
use crate::models::CreateBookingRequest;
use crate::pagination::PageQuery;
use crate::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/booking", post(create_booking))
        .route("/bookings/{id}", get(get_booking))
        .route("/user/bookings", get(get_user_bookings))
}

// POST /api/booking
async fn create_booking(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    JsonBody(req): JsonBody<CreateBookingRequest>,
) -> Result<impl IntoResponse, AppError> {
    let booking = state.bookings.create_booking(user.user_id, req).await?;
    Ok((StatusCode::CREATED, Json(booking)))
}

// GET /api/bookings/{id}
async fn get_booking(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    Ok(Json(state.bookings.get_booking(user.user_id, id).await?))
}

// GET /api/user/bookings?page&limit
async fn get_user_bookings(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    Query(page): Query<PageQuery>,
) -> Result<impl IntoResponse, AppError> {
    Ok(Json(state.bookings.get_user_bookings(user.user_id, page.into()).await?))
}
