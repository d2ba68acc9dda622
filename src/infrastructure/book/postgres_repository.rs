//! PostgreSQL book repository implementation

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{PgPool, Row};

use crate::domain::book::{Book, BookDetails, BookId, BookRepository};
use crate::domain::DomainError;
use crate::infrastructure::database::{is_foreign_key_violation, map_sqlx_error};

/// PostgreSQL implementation of BookRepository
#[derive(Debug, Clone)]
pub struct PostgresBookRepository {
    pool: PgPool,
}

impl PostgresBookRepository {
    /// Create a new repository with the given connection pool
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl BookRepository for PostgresBookRepository {
    async fn get(&self, id: BookId) -> Result<Option<Book>, DomainError> {
        let row = sqlx::query(
            r#"
            SELECT id, title, author, amount, created_at, updated_at
            FROM books
            WHERE id = $1
            "#,
        )
        .bind(id.as_i64())
        .fetch_optional(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        row.as_ref().map(row_to_book).transpose()
    }

    async fn list(&self) -> Result<Vec<Book>, DomainError> {
        let rows = sqlx::query(
            r#"
            SELECT id, title, author, amount, created_at, updated_at
            FROM books
            ORDER BY id
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        rows.iter().map(row_to_book).collect()
    }

    async fn search(&self, title: &str) -> Result<Vec<Book>, DomainError> {
        let rows = sqlx::query(
            r#"
            SELECT id, title, author, amount, created_at, updated_at
            FROM books
            WHERE title ILIKE $1
            ORDER BY id
            "#,
        )
        .bind(format!("%{}%", escape_like(title)))
        .fetch_all(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        rows.iter().map(row_to_book).collect()
    }

    async fn create(&self, details: &BookDetails) -> Result<BookId, DomainError> {
        let id: i64 = sqlx::query_scalar(
            r#"
            INSERT INTO books (title, author, amount)
            VALUES ($1, $2, $3)
            RETURNING id
            "#,
        )
        .bind(details.title())
        .bind(details.author())
        .bind(details.amount())
        .fetch_one(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        BookId::new(id).map_err(|e| DomainError::storage(format!("Invalid book ID in database: {}", e)))
    }

    async fn update(
        &self,
        id: BookId,
        details: &BookDetails,
        updated_at: DateTime<Utc>,
    ) -> Result<bool, DomainError> {
        let result = sqlx::query(
            r#"
            UPDATE books
            SET title = $2, author = $3, amount = $4, updated_at = $5
            WHERE id = $1
            "#,
        )
        .bind(id.as_i64())
        .bind(details.title())
        .bind(details.author())
        .bind(details.amount())
        .bind(updated_at)
        .execute(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        Ok(result.rows_affected() > 0)
    }

    async fn delete(&self, id: BookId) -> Result<bool, DomainError> {
        let result = sqlx::query("DELETE FROM books WHERE id = $1")
            .bind(id.as_i64())
            .execute(&self.pool)
            .await
            .map_err(|e| {
                if is_foreign_key_violation(&e) {
                    DomainError::validation(format!("book {} is referenced by loans", id))
                } else {
                    map_sqlx_error(e)
                }
            })?;

        Ok(result.rows_affected() > 0)
    }
}

/// Escape LIKE wildcards so the query matches literally
fn escape_like(input: &str) -> String {
    let mut escaped = String::with_capacity(input.len());

    for c in input.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }

    escaped
}

fn row_to_book(row: &sqlx::postgres::PgRow) -> Result<Book, DomainError> {
    let id: i64 = row.try_get("id").map_err(map_sqlx_error)?;
    let title: String = row.try_get("title").map_err(map_sqlx_error)?;
    let author: String = row.try_get("author").map_err(map_sqlx_error)?;
    let amount: i32 = row.try_get("amount").map_err(map_sqlx_error)?;
    let created_at: DateTime<Utc> = row.try_get("created_at").map_err(map_sqlx_error)?;
    let updated_at: Option<DateTime<Utc>> = row.try_get("updated_at").map_err(map_sqlx_error)?;

    let book_id = BookId::new(id)
        .map_err(|e| DomainError::storage(format!("Invalid book ID in database: {}", e)))?;

    Ok(Book::restore(book_id, title, author, amount, created_at, updated_at))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape_like() {
        assert_eq!(escape_like("go"), "go");
        assert_eq!(escape_like("100%"), "100\\%");
        assert_eq!(escape_like("a_b\\c"), "a\\_b\\\\c");
    }
}
