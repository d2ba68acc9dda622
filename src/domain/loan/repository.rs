//! Loan repository trait

use async_trait::async_trait;
#[cfg(test)]
use mockall::automock;

use super::entity::Loan;
use crate::domain::book::{Book, BookId};
use crate::domain::user::{User, UserId};
use crate::domain::DomainError;

/// Repository trait for loans and the two stock-moving transactions
///
/// Both transactions move the stored stock by exactly one copy relative to
/// its current value, not to the amount on the `book` argument. A borrow
/// that would take the stock below zero fails with `BookUnavailable`, a
/// return that would overflow it fails with `Validation`. The stock write
/// and the loan write apply as one unit: either both commit or neither does.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait LoanRepository: Send + Sync {
    /// Whether `user_id` currently holds an unreturned copy of `book_id`
    async fn has_open_loan(&self, user_id: UserId, book_id: BookId) -> Result<bool, DomainError>;

    /// Every loan of a user, open and returned, in store order
    async fn search(&self, user_id: UserId) -> Result<Vec<Loan>, DomainError>;

    /// Take one copy off the stored stock and insert an open loan
    ///
    /// A second open loan for the same pair fails with `ReturnFirst`.
    async fn borrow_transaction(&self, user: &User, book: &Book) -> Result<Loan, DomainError>;

    /// Put one copy back on the stored stock and close the open loan
    ///
    /// Fails with `LoanAlreadyReturned` when no open loan is left to close.
    async fn return_transaction(&self, user: &User, book: &Book) -> Result<(), DomainError>;
}
