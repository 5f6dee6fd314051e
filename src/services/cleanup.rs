use chrono::Utc;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::{error, info};

use crate::store::{Storage, UserStore};

pub struct CleanupService {
    store: Arc<dyn Storage>,
}

impl CleanupService {
    pub fn new(store: Arc<dyn Storage>) -> Self {
        Self { store }
    }

    /// One maintenance pass. Returns the number of rows removed.
    pub async fn run_once(&self) -> u64 {
        match self.store.delete_expired_verifications(Utc::now()).await {
            Ok(0) => {
                info!("🧹 No expired verification codes to clean up");
                0
            }
            Ok(removed) => {
                info!("🧹 Removed {} expired verification codes", removed);
                removed
            }
            Err(e) => {
                error!("🧹 Verification cleanup failed: {}", e);
                0
            }
        }
    }

    /// Runs [`run_once`](Self::run_once) every `interval` until the task is aborted.
    pub fn spawn(self, interval: Duration) -> JoinHandle<()> {
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            loop {
                ticker.tick().await;
                self.run_once().await;
            }
        })
    }
}
