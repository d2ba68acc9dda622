//! Loan service - borrow and return across users, books and loans

use std::sync::Arc;

use tracing::{info, instrument, warn};

use crate::domain::book::{Book, BookId, BookRepository};
use crate::domain::loan::{Loan, LoanKey, LoanRepository};
use crate::domain::user::{User, UserId, UserRepository};
use crate::domain::{DomainError, ResultExt};
use crate::infrastructure::observability::{record_loan_operation, LoanOperation};

/// Loan service coordinating the three repositories
///
/// Per (user, book) pair a loan moves from no open loan, to open on borrow,
/// and back to no open loan on return. Nothing else is legal.
pub struct LoanService<L: LoanRepository, U: UserRepository, B: BookRepository> {
    loans: Arc<L>,
    users: Arc<U>,
    books: Arc<B>,
}

impl<L, U, B> LoanService<L, U, B>
where
    L: LoanRepository,
    U: UserRepository,
    B: BookRepository,
{
    /// Create a new loan service
    pub fn new(loans: Arc<L>, users: Arc<U>, books: Arc<B>) -> Self {
        Self {
            loans,
            users,
            books,
        }
    }

    /// Lend one copy of a book to a user
    #[instrument(skip(self), fields(user_id = %key.user_id(), book_id = %key.book_id()))]
    pub async fn borrow(&self, key: LoanKey) -> Result<(), DomainError> {
        let result = self.try_borrow(key).await;

        record_loan_operation(LoanOperation::Borrow, result.as_ref().map(|_| ()));
        match &result {
            Ok(loan) => info!(loan_id = %loan.id(), "Book borrowed"),
            Err(e) => warn!(kind = %e.kind(), error = %e, "Borrow rejected"),
        }

        result.map(|_| ())
    }

    /// Take back a user's copy of a book
    #[instrument(skip(self), fields(user_id = %key.user_id(), book_id = %key.book_id()))]
    pub async fn return_book(&self, key: LoanKey) -> Result<(), DomainError> {
        let result = self.try_return(key).await;

        record_loan_operation(LoanOperation::Return, result.as_ref().map(|_| ()));
        match &result {
            Ok(()) => info!("Book returned"),
            Err(e) => warn!(kind = %e.kind(), error = %e, "Return rejected"),
        }

        result
    }

    /// Every loan of a user, open and returned
    pub async fn search(&self, user_id: UserId) -> Result<Vec<Loan>, DomainError> {
        let loans = self
            .loans
            .search(user_id)
            .await
            .context("search user loans")?;

        if loans.is_empty() {
            return Err(DomainError::no_loans_found(format!(
                "user {} does not have any loan",
                user_id
            )));
        }

        Ok(loans)
    }

    async fn try_borrow(&self, key: LoanKey) -> Result<Loan, DomainError> {
        let has_open = self
            .loans
            .has_open_loan(key.user_id(), key.book_id())
            .await
            .context("borrow book")?;

        if has_open {
            return Err(DomainError::return_first(
                "return the book first before borrowing it again",
            ));
        }

        let user = self.load_user(key.user_id()).await?;
        let mut book = self.load_book(key.book_id()).await?;

        book.checkout()?;

        self.loans
            .borrow_transaction(&user, &book)
            .await
            .context("borrow book")
    }

    async fn try_return(&self, key: LoanKey) -> Result<(), DomainError> {
        let has_open = self
            .loans
            .has_open_loan(key.user_id(), key.book_id())
            .await
            .context("return book")?;

        if !has_open {
            return Err(DomainError::loan_already_returned(
                "loan doesn't exist or was already returned",
            ));
        }

        let user = self.load_user(key.user_id()).await?;
        let mut book = self.load_book(key.book_id()).await?;

        book.check_in()?;

        self.loans
            .return_transaction(&user, &book)
            .await
            .context("return book")
    }

    async fn load_user(&self, id: UserId) -> Result<User, DomainError> {
        self.users
            .get(id)
            .await
            .context("get user")?
            .ok_or_else(|| DomainError::user_not_found(format!("user {} not found", id)))
    }

    async fn load_book(&self, id: BookId) -> Result<Book, DomainError> {
        self.books
            .get(id)
            .await
            .context("get book")?
            .ok_or_else(|| DomainError::book_not_found(format!("book {} not found", id)))
    }
}
