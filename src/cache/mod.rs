//! Login session storage.
//!
//! A session maps a bearer token to its user id for the lifetime of the token.
//! Tokens are never stored in clear; keys are `session:{base64url(sha256(token))}`.

use async_trait::async_trait;
use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use sha2::{Digest, Sha256};
use std::time::Duration;

use crate::store::StoreResult;

pub mod auth;
pub mod memory;

pub use auth::RedisSessionStore;
pub use memory::MemorySessionStore;

#[async_trait]
pub trait SessionStore: Send + Sync {
    async fn put(&self, token: &str, user_id: i64, ttl: Duration) -> StoreResult<()>;

    /// The session's user id, `None` when missing or expired.
    async fn get(&self, token: &str) -> StoreResult<Option<i64>>;

    async fn remove(&self, token: &str) -> StoreResult<()>;
}

pub fn session_key(token: &str) -> String {
    format!("session:{}", URL_SAFE_NO_PAD.encode(Sha256::digest(token.as_bytes())))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn key_hides_the_token() {
        let key = session_key("eyJhbGciOiJIUzI1NiJ9.secret");
        assert!(key.starts_with("session:"));
        assert!(!key.contains("secret"));
        assert_eq!(key, session_key("eyJhbGciOiJIUzI1NiJ9.secret"));
        assert_ne!(key, session_key("other"));
    }
}
