use axum::{
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use std::sync::Arc;

use crate::error::AppError;
use crate::middleware::{AuthUser, JsonBody};
use crate::models::PaymentRequest;
use crate::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/payment-methods", get(get_payment_methods))
        .route("/pay", post(process_payment))
}

// GET /api/payment-methods
async fn get_payment_methods(State(state): State<Arc<AppState>>) -> Result<impl IntoResponse, AppError> {
    Ok(Json(state.payments.get_payment_methods().await?))
}

// POST /api/pay
async fn process_payment(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    JsonBody(req): JsonBody<PaymentRequest>,
) -> Result<impl IntoResponse, AppError> {
    let payment = state.payments.process_payment(user.user_id, req).await?;
    Ok((StatusCode::CREATED, Json(payment)))
}
