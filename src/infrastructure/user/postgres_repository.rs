//! PostgreSQL user repository implementation

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{PgPool, Row};

use crate::domain::user::{NewUser, User, UserId, UserRepository};
use crate::domain::DomainError;
use crate::infrastructure::database::{
    is_foreign_key_violation, is_unique_violation, map_sqlx_error,
};

/// PostgreSQL implementation of UserRepository
#[derive(Debug, Clone)]
pub struct PostgresUserRepository {
    pool: PgPool,
}

impl PostgresUserRepository {
    /// Create a new repository with the given connection pool
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn map_write_error(err: sqlx::Error, user: &NewUser) -> DomainError {
    if is_unique_violation(&err) {
        return DomainError::already_exists(format!(
            "username '{}' or email '{}' already registered",
            user.username(),
            user.email()
        ));
    }

    map_sqlx_error(err)
}

#[async_trait]
impl UserRepository for PostgresUserRepository {
    async fn get(&self, id: UserId) -> Result<Option<User>, DomainError> {
        let row = sqlx::query(
            r#"
            SELECT id, username, password_hash, email, created_at, updated_at
            FROM users
            WHERE id = $1
            "#,
        )
        .bind(id.as_i64())
        .fetch_optional(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        row.as_ref().map(row_to_user).transpose()
    }

    async fn create(&self, user: &NewUser) -> Result<UserId, DomainError> {
        let id: i64 = sqlx::query_scalar(
            r#"
            INSERT INTO users (username, password_hash, email)
            VALUES ($1, $2, $3)
            RETURNING id
            "#,
        )
        .bind(user.username())
        .bind(user.password_hash())
        .bind(user.email())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| map_write_error(e, user))?;

        UserId::new(id).map_err(|e| DomainError::storage(format!("Invalid user ID in database: {}", e)))
    }

    async fn update(
        &self,
        id: UserId,
        user: &NewUser,
        updated_at: DateTime<Utc>,
    ) -> Result<bool, DomainError> {
        let result = sqlx::query(
            r#"
            UPDATE users
            SET username = $2, password_hash = $3, email = $4, updated_at = $5
            WHERE id = $1
            "#,
        )
        .bind(id.as_i64())
        .bind(user.username())
        .bind(user.password_hash())
        .bind(user.email())
        .bind(updated_at)
        .execute(&self.pool)
        .await
        .map_err(|e| map_write_error(e, user))?;

        Ok(result.rows_affected() > 0)
    }

    async fn delete(&self, id: UserId) -> Result<bool, DomainError> {
        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id.as_i64())
            .execute(&self.pool)
            .await
            .map_err(|e| {
                if is_foreign_key_violation(&e) {
                    DomainError::validation(format!("user {} is referenced by loans", id))
                } else {
                    map_sqlx_error(e)
                }
            })?;

        Ok(result.rows_affected() > 0)
    }
}

fn row_to_user(row: &sqlx::postgres::PgRow) -> Result<User, DomainError> {
    let id: i64 = row.try_get("id").map_err(map_sqlx_error)?;
    let username: String = row.try_get("username").map_err(map_sqlx_error)?;
    let password_hash: String = row.try_get("password_hash").map_err(map_sqlx_error)?;
    let email: String = row.try_get("email").map_err(map_sqlx_error)?;
    let created_at: DateTime<Utc> = row.try_get("created_at").map_err(map_sqlx_error)?;
    let updated_at: Option<DateTime<Utc>> = row.try_get("updated_at").map_err(map_sqlx_error)?;

    let user_id = UserId::new(id)
        .map_err(|e| DomainError::storage(format!("Invalid user ID in database: {}", e)))?;

    Ok(User::restore(
        user_id,
        username,
        password_hash,
        email,
        created_at,
        updated_at,
    ))
}
