use anyhow::Context;
use chrono::Utc;
use std::env;
use tracing::info;
use tracing_subscriber::EnvFilter;

use cinema_booking::{database::Database, seed::seed_catalog, store::PgStore};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let url = env::var("DATABASE_URL").context("DATABASE_URL must be set")?;
    let db = Database::connect(&url, 5).await.context("Failed to connect to database")?;
    db.run_migrations().await.context("Failed to run migrations")?;

    let store = PgStore::new(&db);
    let summary = seed_catalog(&store, Utc::now().date_naive()).await.context("Seeding failed")?;
    info!(?summary, "Seeder finished");
    Ok(())
}
