use async_trait::async_trait;
use redis::AsyncCommands;
use std::time::Duration;
use tracing::info;

use super::{session_key, SessionStore};
use crate::redis_client::RedisClient;
use crate::store::StoreResult;

/// Sessions in Redis, expired by the server via `SET ... EX`.
#[derive(Clone)]
pub struct RedisSessionStore {
    redis: RedisClient,
}

impl RedisSessionStore {
    pub fn new(redis: RedisClient) -> Self {
        Self { redis }
    }
}

#[async_trait]
impl SessionStore for RedisSessionStore {
    async fn put(&self, token: &str, user_id: i64, ttl: Duration) -> StoreResult<()> {
        let mut conn = self.redis.conn.clone();
        let _: () = conn.set_ex(session_key(token), user_id, ttl.as_secs().max(1)).await?;
        Ok(())
    }

    async fn get(&self, token: &str) -> StoreResult<Option<i64>> {
        let mut conn = self.redis.conn.clone();
        Ok(conn.get(session_key(token)).await?)
    }

    async fn remove(&self, token: &str) -> StoreResult<()> {
        let mut conn = self.redis.conn.clone();
        let _: () = conn.del(session_key(token)).await?;
        info!("Invalidated session");
        Ok(())
    }
}
