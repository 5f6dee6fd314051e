use axum::{
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use serde_json::json;
use std::sync::Arc;

use crate::error::AppError;
use crate::middleware::{AuthUser, JsonBody};
use crate::models::{LoginRequest, RegisterRequest, ResendOtpRequest, VerifyOtpRequest};
use crate::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/register", post(register))
        .route("/login", post(login))
        .route("/logout", post(logout))
        .route("/verify-email", post(verify_email))
        .route("/resend-otp", post(resend_otp))
        .route("/user/profile", get(profile))
}

// POST /api/register
async fn register(
    State(state): State<Arc<AppState>>,
    JsonBody(req): JsonBody<RegisterRequest>,
) -> Result<impl IntoResponse, AppError> {
    let user = state.auth.register(req).await?;
    Ok((StatusCode::CREATED, Json(user)))
}

// POST /api/login
async fn login(
    State(state): State<Arc<AppState>>,
    JsonBody(req): JsonBody<LoginRequest>,
) -> Result<impl IntoResponse, AppError> {
    Ok(Json(state.auth.login(req).await?))
}

// POST /api/logout
async fn logout(State(state): State<Arc<AppState>>, user: AuthUser) -> Result<impl IntoResponse, AppError> {
    state.auth.logout(&user.token).await?;
    Ok(Json(json!({ "message": "Logout successful" })))
}

// POST /api/verify-email
async fn verify_email(
    State(state): State<Arc<AppState>>,
    JsonBody(req): JsonBody<VerifyOtpRequest>,
) -> Result<impl IntoResponse, AppError> {
    state.otp.verify_email(req).await?;
    Ok(Json(json!({ "message": "Email verified successfully" })))
}

// POST /api/resend-otp
async fn resend_otp(
    State(state): State<Arc<AppState>>,
    JsonBody(req): JsonBody<ResendOtpRequest>,
) -> Result<impl IntoResponse, AppError> {
    state.otp.resend_otp(req).await?;
    Ok(Json(json!({ "message": "Verification code sent" })))
}

// GET /api/user/profile
async fn profile(State(state): State<Arc<AppState>>, user: AuthUser) -> Result<impl IntoResponse, AppError> {
    Ok(Json(state.auth.profile(user.user_id).await?))
}
