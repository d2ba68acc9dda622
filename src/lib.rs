//! Public library backend
//!
//! REST API for a lending library:
//! - Book catalogue with stock tracking
//! - User accounts with Argon2 password hashing
//! - Borrow and return transactions that keep stock and loans consistent
//! - In-memory or PostgreSQL storage

pub mod api;
pub mod cli;
pub mod config;
pub mod domain;
pub mod infrastructure;

pub use config::AppConfig;

use std::sync::Arc;

use anyhow::Context;
use sqlx::PgPool;
use tracing::info;

use api::state::AppState;
use config::StorageBackend;
use infrastructure::{
    book::{BookService, PostgresBookRepository},
    database,
    in_memory::InMemoryLibraryStore,
    loan::{LoanService, PostgresLoanRepository},
    user::{Argon2Hasher, PostgresUserRepository, UserService},
};

/// Create the application state with default configuration
pub async fn create_app_state() -> anyhow::Result<AppState> {
    create_app_state_with_config(&AppConfig::default()).await
}

/// Create the application state for the configured storage backend
pub async fn create_app_state_with_config(config: &AppConfig) -> anyhow::Result<AppState> {
    let backend = config
        .database
        .storage_backend()
        .map_err(anyhow::Error::msg)?;

    match backend {
        StorageBackend::Memory => {
            info!("Using in-memory storage");
            Ok(in_memory_app_state(Arc::new(InMemoryLibraryStore::new())))
        }
        StorageBackend::Postgres => {
            info!("Using PostgreSQL storage");
            let pool = database::connect(&config.database)
                .await
                .context("failed to connect to PostgreSQL")?;

            if config.database.run_migrations {
                database::run_migrations(&pool)
                    .await
                    .context("failed to run migrations")?;
                info!("Database migrations applied");
            }

            Ok(postgres_app_state(pool))
        }
    }
}

/// Build services that share one in-memory store
pub fn in_memory_app_state(store: Arc<InMemoryLibraryStore>) -> AppState {
    let hasher = Arc::new(Argon2Hasher::new());

    AppState {
        book_service: Arc::new(BookService::new(store.clone())),
        user_service: Arc::new(UserService::new(store.clone(), hasher)),
        loan_service: Arc::new(LoanService::new(store.clone(), store.clone(), store)),
    }
}

/// Build services backed by a PostgreSQL pool
pub fn postgres_app_state(pool: PgPool) -> AppState {
    let books = Arc::new(PostgresBookRepository::new(pool.clone()));
    let users = Arc::new(PostgresUserRepository::new(pool.clone()));
    let loans = Arc::new(PostgresLoanRepository::new(pool));
    let hasher = Arc::new(Argon2Hasher::new());

    AppState {
        book_service: Arc::new(BookService::new(books.clone())),
        user_service: Arc::new(UserService::new(users.clone(), hasher)),
        loan_service: Arc::new(LoanService::new(loans, users, books)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_default_state_uses_memory() {
        let state = create_app_state().await.unwrap();
        let err = state.book_service.list().await.unwrap_err();
        assert_eq!(err.kind(), domain::ErrorKind::BookNotFound);
    }

    #[tokio::test]
    async fn test_unknown_backend_is_rejected() {
        let mut config = AppConfig::default();
        config.database.backend = "sqlite".to_string();

        let result = create_app_state_with_config(&config).await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_postgres_backend_requires_url() {
        let mut config = AppConfig::default();
        config.database.backend = "postgres".to_string();
        config.database.url = Some("not a url".to_string());

        let result = create_app_state_with_config(&config).await;
        assert!(result.is_err());
    }
}
