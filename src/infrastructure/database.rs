//! PostgreSQL pool setup, migrations and store error classification

use std::str::FromStr;

use sqlx::migrate::MigrateError;
use sqlx::postgres::{PgConnectOptions, PgPoolOptions};
use sqlx::PgPool;

use crate::config::DatabaseConfig;
use crate::domain::DomainError;

/// SQLSTATE raised when `statement_timeout` cancels a query
const QUERY_CANCELED: &str = "57014";

/// Open a connection pool with per-connection `statement_timeout`
pub async fn connect(config: &DatabaseConfig) -> Result<PgPool, sqlx::Error> {
    let url = config
        .connection_url()
        .ok_or_else(|| sqlx::Error::Configuration("database url is not configured".into()))?;

    let options = PgConnectOptions::from_str(&url)?
        .options([("statement_timeout", config.statement_timeout_ms.to_string())]);

    PgPoolOptions::new()
        .max_connections(config.max_connections)
        .acquire_timeout(config.acquire_timeout())
        .connect_with(options)
        .await
}

/// Apply the embedded schema migrations
pub async fn run_migrations(pool: &PgPool) -> Result<(), MigrateError> {
    sqlx::migrate!("./migrations").run(pool).await
}

pub fn is_unique_violation(err: &sqlx::Error) -> bool {
    matches!(err, sqlx::Error::Database(db) if db.is_unique_violation())
}

pub fn is_foreign_key_violation(err: &sqlx::Error) -> bool {
    matches!(err, sqlx::Error::Database(db) if db.is_foreign_key_violation())
}

pub fn is_timeout(err: &sqlx::Error) -> bool {
    match err {
        sqlx::Error::PoolTimedOut => true,
        sqlx::Error::Database(db) => db.code().as_deref() == Some(QUERY_CANCELED),
        _ => false,
    }
}

/// Map a store error onto a domain error kind
///
/// Timeouts keep their own kind; everything else not classified by the
/// caller becomes a storage error.
pub fn map_sqlx_error(err: sqlx::Error) -> DomainError {
    if is_timeout(&err) {
        return DomainError::timeout(err.to_string());
    }

    DomainError::storage(err.to_string())
}


#[cfg(test)]
mod tests {
    use super::test_support::FakeDatabaseError;
    use super::*;
    use crate::domain::ErrorKind;

    #[test]
    fn test_constraint_violations_are_classified() {
        assert!(is_unique_violation(&FakeDatabaseError::unique_violation().into_sqlx()));
        assert!(!is_unique_violation(&FakeDatabaseError::other().into_sqlx()));
        assert!(is_foreign_key_violation(
            &FakeDatabaseError::foreign_key_violation().into_sqlx()
        ));
        assert!(!is_foreign_key_violation(&FakeDatabaseError::unique_violation().into_sqlx()));
    }

    #[test]
    fn test_canceled_statement_maps_to_timeout() {
        let err = map_sqlx_error(FakeDatabaseError::query_canceled().into_sqlx());
        assert_eq!(err.kind(), ErrorKind::Timeout);

        let err = map_sqlx_error(FakeDatabaseError::other().into_sqlx());
        assert_eq!(err.kind(), ErrorKind::Persistence);
    }

    #[test]
    fn test_pool_timeout_maps_to_timeout() {
        let err = map_sqlx_error(sqlx::Error::PoolTimedOut);
        assert_eq!(err.kind(), ErrorKind::Timeout);
    }

    #[test]
    fn test_other_errors_map_to_persistence() {
        let err = map_sqlx_error(sqlx::Error::RowNotFound);
        assert_eq!(err.kind(), ErrorKind::Persistence);

        assert!(!is_unique_violation(&sqlx::Error::RowNotFound));
        assert!(!is_foreign_key_violation(&sqlx::Error::PoolClosed));
    }

    #[tokio::test]
    async fn test_connect_with_invalid_url_fails() {
        let config = DatabaseConfig {
            url: Some("not a url".to_string()),
            ..DatabaseConfig::default()
        };

        assert!(connect(&config).await.is_err());
    }
}
