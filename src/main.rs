use anyhow::Context;
use chrono::Utc;
use mimalloc::MiMalloc;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use cinema_booking::{
    cache::{MemorySessionStore, RedisSessionStore, SessionStore},
    config::{Config, StorageBackend},
    database::Database,
    redis_client::RedisClient,
    seed::seed_catalog,
    services::{CleanupService, Mailer, Notifier},
    store::{MemoryStore, PgStore, Storage},
    AppState,
};

#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

fn init_tracing(config: &Config) {
    let filter = EnvFilter::try_new(&config.app.rust_log).unwrap_or_else(|_| EnvFilter::new("info"));
    let registry = tracing_subscriber::registry().with(filter);
    if config.app.log_format.eq_ignore_ascii_case("json") {
        registry.with(fmt::layer().json()).init();
    } else {
        registry.with(fmt::layer()).init();
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = Config::from_env().context("Invalid configuration")?;
    init_tracing(&config);

    info!("Starting Cinema Booking API ({})", config.app.environment);

    let store: Arc<dyn Storage> = match config.app.storage {
        StorageBackend::Postgres => {
            let db = Database::connect(&config.database.url, config.database.pool_size)
                .await
                .context("Failed to connect to database")?;
            db.run_migrations().await.context("Failed to run migrations")?;
            Arc::new(PgStore::new(&db))
        }
        StorageBackend::Memory => {
            warn!("Using in-memory storage, all data is lost on exit");
            let store: Arc<dyn Storage> = Arc::new(MemoryStore::new());
            seed_catalog(store.as_ref(), Utc::now().date_naive())
                .await
                .context("Failed to seed in-memory catalog")?;
            store
        }
    };

    let sessions: Arc<dyn SessionStore> = match &config.redis.url {
        Some(url) => {
            let redis = RedisClient::connect(url).await.context("Failed to connect to Redis")?;
            Arc::new(RedisSessionStore::new(redis))
        }
        None => {
            warn!("REDIS_URL not set, sessions are kept in process memory");
            Arc::new(MemorySessionStore::new())
        }
    };

    let mailer = Mailer::from_config(&config.email).context("Failed to build mail client")?;
    let (notifier, notifier_task) = Notifier::spawn(mailer, config.notifier.queue_capacity);

    // --- Background tasks ---
    let cleanup_task =
        CleanupService::new(store.clone()).spawn(Duration::from_secs(config.cleanup.interval_secs.max(1)));

    // --- Web server ---
    let state = AppState::new(config.clone(), store, sessions, notifier);
    let app = cinema_booking::app(state);

    let listener = tokio::net::TcpListener::bind((config.app.host.as_str(), config.app.port))
        .await
        .with_context(|| format!("Failed to bind {}:{}", config.app.host, config.app.port))?;
    info!("Server listening on {}", listener.local_addr()?);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    cleanup_task.abort();
    // The router owned the last notifier handles; let the worker drain what is queued.
    if tokio::time::timeout(Duration::from_secs(5), notifier_task).await.is_err() {
        warn!("Notification worker did not drain in time");
    }
    info!("Server stopped");
    Ok(())
}
