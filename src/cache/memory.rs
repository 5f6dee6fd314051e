use async_trait::async_trait;
use std::collections::HashMap;
use std::time::Duration;
use tokio::{sync::RwLock, time::Instant};

use super::{session_key, SessionStore};
use crate::store::StoreResult;

#[derive(Default)]
pub struct MemorySessionStore {
    sessions: RwLock<HashMap<String, (i64, Instant)>>,
}

impl MemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SessionStore for MemorySessionStore {
    async fn put(&self, token: &str, user_id: i64, ttl: Duration) -> StoreResult<()> {
        let mut sessions = self.sessions.write().await;
        let now = Instant::now();
        sessions.retain(|_, (_, expires)| *expires > now);
        sessions.insert(session_key(token), (user_id, now + ttl));
        Ok(())
    }

    async fn get(&self, token: &str) -> StoreResult<Option<i64>> {
        let sessions = self.sessions.read().await;
        Ok(sessions
            .get(&session_key(token))
            .filter(|(_, expires)| *expires > Instant::now())
            .map(|(user_id, _)| *user_id))
    }

    async fn remove(&self, token: &str) -> StoreResult<()> {
        self.sessions.write().await.remove(&session_key(token));
        Ok(())
    }
}
