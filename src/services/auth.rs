//! Registration, login and bearer-token resolution.
//!
//! A token is accepted only while both hold: its session is present in the
//! [`SessionStore`] and the JWT itself verifies (signature and expiry). Logging out
//! removes the session, which revokes the token before its `exp`.

use chrono::Utc;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use std::{sync::Arc, time::Duration};
use tracing::{info, warn};
use uuid::Uuid;
use validator::Validate;

use super::otp::OtpService;
use crate::cache::SessionStore;
use crate::config::JwtConfig;
use crate::error::{AppError, AppResult, StoreContext};
use crate::models::{LoginRequest, LoginResponse, NewUser, RegisterRequest, UserProfile};
use crate::store::{Storage, UserStore};

#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    /// User id.
    pub sub: String,
    pub exp: i64,
    pub iat: i64,
    /// Keeps two tokens issued in the same second distinct.
    pub jti: String,
}

#[derive(Clone)]
pub struct AuthService {
    store: Arc<dyn Storage>,
    sessions: Arc<dyn SessionStore>,
    otp: OtpService,
    jwt: JwtConfig,
}

impl AuthService {
    pub fn new(store: Arc<dyn Storage>, sessions: Arc<dyn SessionStore>, otp: OtpService, jwt: JwtConfig) -> Self {
        Self { store, sessions, otp, jwt }
    }

    fn token_ttl(&self) -> Duration {
        Duration::from_secs(self.jwt.expires_in_hours.max(1) as u64 * 3600)
    }

    pub async fn register(&self, req: RegisterRequest) -> AppResult<UserProfile> {
        req.validate()?;

        let cost = self.jwt.bcrypt_cost;
        let password = req.password;
        let password_hash = tokio::task::spawn_blocking(move || bcrypt::hash(password, cost))
            .await
            .map_err(|e| AppError::Internal(format!("password hashing task failed: {e}")))?
            .map_err(|e| AppError::Internal(format!("failed to hash password: {e}")))?;

        let user = self
            .store
            .create_user(NewUser { username: req.username, email: req.email, password_hash })
            .await
            .context("create user")?;
        info!(user_id = user.id, "user registered");

        if let Err(e) = self.otp.issue(&user).await {
            warn!(user_id = user.id, "could not issue verification code: {}", e);
        }
        Ok(UserProfile::from(&user))
    }

    pub async fn login(&self, req: LoginRequest) -> AppResult<LoginResponse> {
        req.validate()?;
        let invalid = || AppError::Unauthenticated("invalid credentials".into());

        let user = self
            .store
            .user_by_username(&req.username)
            .await
            .context("load user")?
            .ok_or_else(invalid)?;

        let hash = user.password.clone();
        let password = req.password;
        let matches = tokio::task::spawn_blocking(move || bcrypt::verify(password, &hash))
            .await
            .map_err(|e| AppError::Internal(format!("password check task failed: {e}")))?
            .unwrap_or(false);
        if !matches {
            return Err(invalid());
        }

        let token = self.issue_token(user.id)?;
        self.sessions
            .put(&token, user.id, self.token_ttl())
            .await
            .context("store session")?;
        info!(user_id = user.id, "user logged in");

        Ok(LoginResponse { id: user.id, username: user.username, email: user.email, token })
    }

    pub async fn logout(&self, token: &str) -> AppResult<()> {
        self.sessions.remove(token).await.context("remove session")
    }

    /// Maps a bearer token to its user id.
    pub async fn resolve_caller(&self, token: &str) -> AppResult<i64> {
        let session_user = self
            .sessions
            .get(token)
            .await
            .context("load session")?
            .ok_or_else(|| AppError::Unauthenticated("session expired or invalid".into()))?;

        let claims = self.verify_token(token)?;
        match claims.sub.parse::<i64>() {
            Ok(user_id) if user_id == session_user => Ok(user_id),
            _ => Err(AppError::Unauthenticated("invalid token".into())),
        }
    }

    pub async fn profile(&self, user_id: i64) -> AppResult<UserProfile> {
        let user = self
            .store
            .user_by_id(user_id)
            .await
            .context("load user")?
            .ok_or(AppError::NotFound("user"))?;
        Ok(UserProfile::from(&user))
    }

    fn issue_token(&self, user_id: i64) -> AppResult<String> {
        let now = Utc::now().timestamp();
        let claims = Claims {
            sub: user_id.to_string(),
            iat: now,
            exp: now + self.token_ttl().as_secs() as i64,
            jti: Uuid::new_v4().to_string(),
        };
        encode(&Header::new(Algorithm::HS256), &claims, &EncodingKey::from_secret(self.jwt.secret.as_bytes()))
            .map_err(|e| AppError::Internal(format!("failed to sign token: {e}")))
    }

    fn verify_token(&self, token: &str) -> AppResult<Claims> {
        decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.jwt.secret.as_bytes()),
            &Validation::new(Algorithm::HS256),
        )
        .map(|data| data.claims)
        .map_err(|_| AppError::Unauthenticated("invalid token".into()))
    }
}
