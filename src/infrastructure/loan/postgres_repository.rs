//! PostgreSQL loan repository implementation

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{PgConnection, PgPool, Row};

use crate::domain::book::{Book, BookId};
use crate::domain::loan::{Loan, LoanId, LoanRepository};
use crate::domain::user::{User, UserId};
use crate::domain::DomainError;
use crate::infrastructure::database::{is_unique_violation, map_sqlx_error};

/// PostgreSQL implementation of LoanRepository
///
/// Each transaction runs at the default READ COMMITTED isolation. Dropping
/// the future mid-transaction rolls it back.
#[derive(Debug, Clone)]
pub struct PostgresLoanRepository {
    pool: PgPool,
}

impl PostgresLoanRepository {
    /// Create a new repository with the given connection pool
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// Move the stored stock of `book` by `delta`, keeping it within the column range
async fn move_stock(conn: &mut PgConnection, book: &Book, delta: i64) -> Result<(), DomainError> {
    let result = sqlx::query(
        r#"
        UPDATE books
        SET amount = amount + $1
        WHERE id = $2 AND amount::BIGINT + $1 BETWEEN 0 AND 2147483647
        "#,
    )
    .bind(delta)
    .bind(book.id().as_i64())
    .execute(conn)
    .await
    .map_err(map_sqlx_error)?;

    if result.rows_affected() == 0 {
        return Err(stock_unchanged_error(book.id(), delta));
    }

    Ok(())
}

/// Error for a stock move that matched no row
fn stock_unchanged_error(book_id: BookId, delta: i64) -> DomainError {
    if delta < 0 {
        DomainError::book_unavailable(format!("book {} unavailable at the moment", book_id))
    } else {
        DomainError::validation(format!(
            "book {} cannot hold more than {} copies",
            book_id,
            i32::MAX
        ))
    }
}

/// Classify a failed loan insert
///
/// The partial unique index on open loans turns a concurrent second borrow
/// of the same pair into `ReturnFirst`.
fn loan_insert_error(err: sqlx::Error, user_id: UserId, book_id: BookId) -> DomainError {
    if is_unique_violation(&err) {
        return DomainError::return_first(format!(
            "user {} must return book {} first",
            user_id, book_id
        ));
    }

    map_sqlx_error(err)
}

#[async_trait]
impl LoanRepository for PostgresLoanRepository {
    async fn has_open_loan(&self, user_id: UserId, book_id: BookId) -> Result<bool, DomainError> {
        sqlx::query_scalar(
            r#"
            SELECT EXISTS (
                SELECT 1 FROM loans
                WHERE user_id = $1 AND book_id = $2 AND NOT is_returned
            )
            "#,
        )
        .bind(user_id.as_i64())
        .bind(book_id.as_i64())
        .fetch_one(&self.pool)
        .await
        .map_err(map_sqlx_error)
    }

    async fn search(&self, user_id: UserId) -> Result<Vec<Loan>, DomainError> {
        let rows = sqlx::query(
            r#"
            SELECT id, user_id, book_id, is_returned, created_at
            FROM loans
            WHERE user_id = $1
            ORDER BY id
            "#,
        )
        .bind(user_id.as_i64())
        .fetch_all(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        rows.iter().map(row_to_loan).collect()
    }

    async fn borrow_transaction(&self, user: &User, book: &Book) -> Result<Loan, DomainError> {
        let mut tx = self.pool.begin().await.map_err(map_sqlx_error)?;

        if let Err(e) = move_stock(&mut *tx, book, -1).await {
            tx.rollback().await.map_err(map_sqlx_error)?;
            return Err(e);
        }

        let inserted = sqlx::query(
            r#"
            INSERT INTO loans (user_id, book_id)
            VALUES ($1, $2)
            RETURNING id, user_id, book_id, is_returned, created_at
            "#,
        )
        .bind(user.id().as_i64())
        .bind(book.id().as_i64())
        .fetch_one(&mut *tx)
        .await;

        let row = match inserted {
            Ok(row) => row,
            Err(e) => {
                tx.rollback().await.map_err(map_sqlx_error)?;
                return Err(loan_insert_error(e, user.id(), book.id()));
            }
        };

        let loan = row_to_loan(&row)?;
        tx.commit().await.map_err(map_sqlx_error)?;

        Ok(loan)
    }

    async fn return_transaction(&self, user: &User, book: &Book) -> Result<(), DomainError> {
        let mut tx = self.pool.begin().await.map_err(map_sqlx_error)?;

        let closed = sqlx::query(
            r#"
            UPDATE loans
            SET is_returned = TRUE
            WHERE user_id = $1 AND book_id = $2 AND NOT is_returned
            "#,
        )
        .bind(user.id().as_i64())
        .bind(book.id().as_i64())
        .execute(&mut *tx)
        .await
        .map_err(map_sqlx_error)?;

        if closed.rows_affected() == 0 {
            tx.rollback().await.map_err(map_sqlx_error)?;
            return Err(DomainError::loan_already_returned(format!(
                "user {} holds no open loan of book {}",
                user.id(),
                book.id()
            )));
        }

        if let Err(e) = move_stock(&mut *tx, book, 1).await {
            tx.rollback().await.map_err(map_sqlx_error)?;
            return Err(e);
        }

        tx.commit().await.map_err(map_sqlx_error)
    }
}

fn row_to_loan(row: &sqlx::postgres::PgRow) -> Result<Loan, DomainError> {
    let id: i64 = row.try_get("id").map_err(map_sqlx_error)?;
    let user_id: i64 = row.try_get("user_id").map_err(map_sqlx_error)?;
    let book_id: i64 = row.try_get("book_id").map_err(map_sqlx_error)?;
    let is_returned: bool = row.try_get("is_returned").map_err(map_sqlx_error)?;
    let created_at: DateTime<Utc> = row.try_get("created_at").map_err(map_sqlx_error)?;

    let invalid = |e: String| DomainError::storage(format!("Invalid loan row in database: {}", e));

    Ok(Loan::restore(
        LoanId::new(id).map_err(|e| invalid(e.to_string()))?,
        UserId::new(user_id).map_err(|e| invalid(e.to_string()))?,
        BookId::new(book_id).map_err(|e| invalid(e.to_string()))?,
        is_returned,
        created_at,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ErrorKind;
    use crate::infrastructure::database::test_support::FakeDatabaseError;

    fn ids() -> (UserId, BookId) {
        (UserId::new(3).unwrap(), BookId::new(7).unwrap())
    }

    #[test]
    fn test_open_loan_index_violation_is_return_first() {
        let (user_id, book_id) = ids();
        let err = FakeDatabaseError::unique_violation().into_sqlx();

        let mapped = loan_insert_error(err, user_id, book_id);

        assert_eq!(mapped.kind(), ErrorKind::ReturnFirst);
        assert_eq!(mapped.message(), "user 3 must return book 7 first");
    }

    #[test]
    fn test_other_insert_failures_keep_store_kind() {
        let (user_id, book_id) = ids();

        let mapped = loan_insert_error(FakeDatabaseError::other().into_sqlx(), user_id, book_id);
        assert_eq!(mapped.kind(), ErrorKind::Persistence);

        let canceled = FakeDatabaseError::query_canceled().into_sqlx();
        let mapped = loan_insert_error(canceled, user_id, book_id);
        assert_eq!(mapped.kind(), ErrorKind::Timeout);
    }

    #[test]
    fn test_unmoved_stock_on_borrow_is_unavailable() {
        let (_, book_id) = ids();

        let err = stock_unchanged_error(book_id, -1);

        assert_eq!(err.kind(), ErrorKind::BookUnavailable);
        assert_eq!(err.message(), "book 7 unavailable at the moment");
    }

    #[test]
    fn test_unmoved_stock_on_return_is_validation() {
        let (_, book_id) = ids();

        let err = stock_unchanged_error(book_id, 1);

        assert_eq!(err.kind(), ErrorKind::Validation);
    }
}
