//! Migrate command - applies the PostgreSQL schema and exits

use anyhow::Context;
use tracing::info;

use crate::config::AppConfig;
use crate::infrastructure::{database, logging};

/// Connect to the configured database and apply pending migrations
pub async fn run() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let config = AppConfig::load().unwrap_or_default();
    logging::init_logging(&config.logging)?;

    let pool = database::connect(&config.database)
        .await
        .context("failed to connect to PostgreSQL")?;

    database::run_migrations(&pool)
        .await
        .context("failed to run migrations")?;

    info!("Database migrations applied");
    pool.close().await;

    Ok(())
}
