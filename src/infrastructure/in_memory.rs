//! In-memory library store
//!
//! Books, users and loans share one lock so that the borrow and return
//! transactions can check and write all three tables atomically. Data is lost
//! when the process terminates.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;

use crate::domain::book::{Book, BookDetails, BookId, BookRepository};
use crate::domain::loan::{Loan, LoanId, LoanKey, LoanRepository};
use crate::domain::user::{NewUser, User, UserId, UserRepository};
use crate::domain::DomainError;

#[derive(Debug, Default)]
struct Tables {
    books: BTreeMap<BookId, Book>,
    users: BTreeMap<UserId, User>,
    loans: BTreeMap<LoanId, Loan>,
    last_book_id: i64,
    last_user_id: i64,
    last_loan_id: i64,
}

impl Tables {
    fn next_book_id(&mut self) -> Result<BookId, DomainError> {
        self.last_book_id += 1;
        BookId::new(self.last_book_id).map_err(|e| DomainError::storage(e.to_string()))
    }

    fn next_user_id(&mut self) -> Result<UserId, DomainError> {
        self.last_user_id += 1;
        UserId::new(self.last_user_id).map_err(|e| DomainError::storage(e.to_string()))
    }

    fn next_loan_id(&mut self) -> Result<LoanId, DomainError> {
        self.last_loan_id += 1;
        LoanId::new(self.last_loan_id).map_err(|e| DomainError::storage(e.to_string()))
    }

    fn open_loan_id(&self, user_id: UserId, book_id: BookId) -> Option<LoanId> {
        self.loans
            .values()
            .find(|loan| loan.is_open() && loan.user_id() == user_id && loan.book_id() == book_id)
            .map(Loan::id)
    }

    fn identity_taken(&self, user: &NewUser, except: Option<UserId>) -> bool {
        self.users.values().any(|existing| {
            Some(existing.id()) != except
                && (existing.username() == user.username() || existing.email() == user.email())
        })
    }

    /// Current stored copy of a book a transaction is about to move
    fn stored_book(&self, id: BookId) -> Result<Book, DomainError> {
        self.books
            .get(&id)
            .cloned()
            .ok_or_else(|| DomainError::storage(format!("book {} no longer exists", id)))
    }
}

/// Thread-safe in-memory implementation of the book, user and loan repositories
#[derive(Debug, Default)]
pub struct InMemoryLibraryStore {
    tables: RwLock<Tables>,
    latency: Option<Duration>,
    fail_next_transaction: AtomicBool,
}

impl InMemoryLibraryStore {
    /// Creates a new empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Delay every operation by `latency` before it touches the tables
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    /// Make the next borrow or return transaction fail after its checks pass
    ///
    /// Nothing is written by the failing transaction.
    pub fn fail_next_transaction(&self) {
        self.fail_next_transaction.store(true, Ordering::SeqCst);
    }

    async fn pause(&self) {
        if let Some(latency) = self.latency {
            tokio::time::sleep(latency).await;
        }
    }

    fn injected_failure(&self) -> Result<(), DomainError> {
        if self.fail_next_transaction.swap(false, Ordering::SeqCst) {
            return Err(DomainError::storage("injected transaction failure"));
        }

        Ok(())
    }
}

#[async_trait]
impl BookRepository for InMemoryLibraryStore {
    async fn get(&self, id: BookId) -> Result<Option<Book>, DomainError> {
        self.pause().await;
        let tables = self.tables.read().await;
        Ok(tables.books.get(&id).cloned())
    }

    async fn list(&self) -> Result<Vec<Book>, DomainError> {
        self.pause().await;
        let tables = self.tables.read().await;
        Ok(tables.books.values().cloned().collect())
    }

    async fn search(&self, title: &str) -> Result<Vec<Book>, DomainError> {
        self.pause().await;
        let needle = title.to_lowercase();
        let tables = self.tables.read().await;

        Ok(tables
            .books
            .values()
            .filter(|book| book.title().to_lowercase().contains(&needle))
            .cloned()
            .collect())
    }

    async fn create(&self, details: &BookDetails) -> Result<BookId, DomainError> {
        self.pause().await;
        let mut tables = self.tables.write().await;

        let id = tables.next_book_id()?;
        tables
            .books
            .insert(id, Book::new(id, details.clone(), Utc::now()));

        Ok(id)
    }

    async fn update(
        &self,
        id: BookId,
        details: &BookDetails,
        updated_at: DateTime<Utc>,
    ) -> Result<bool, DomainError> {
        self.pause().await;
        let mut tables = self.tables.write().await;

        match tables.books.get_mut(&id) {
            Some(book) => {
                book.apply(details.clone(), updated_at);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn delete(&self, id: BookId) -> Result<bool, DomainError> {
        self.pause().await;
        let mut tables = self.tables.write().await;

        if !tables.books.contains_key(&id) {
            return Ok(false);
        }

        if tables.loans.values().any(|loan| loan.book_id() == id) {
            return Err(DomainError::validation(format!(
                "book {} is referenced by loans",
                id
            )));
        }

        tables.books.remove(&id);
        Ok(true)
    }
}

#[async_trait]
impl UserRepository for InMemoryLibraryStore {
    async fn get(&self, id: UserId) -> Result<Option<User>, DomainError> {
        self.pause().await;
        let tables = self.tables.read().await;
        Ok(tables.users.get(&id).cloned())
    }

    async fn create(&self, user: &NewUser) -> Result<UserId, DomainError> {
        self.pause().await;
        let mut tables = self.tables.write().await;

        if tables.identity_taken(user, None) {
            return Err(DomainError::already_exists(
                "username or email already registered",
            ));
        }

        let id = tables.next_user_id()?;
        tables
            .users
            .insert(id, User::new(id, user.clone(), Utc::now()));

        Ok(id)
    }

    async fn update(
        &self,
        id: UserId,
        user: &NewUser,
        updated_at: DateTime<Utc>,
    ) -> Result<bool, DomainError> {
        self.pause().await;
        let mut tables = self.tables.write().await;

        if !tables.users.contains_key(&id) {
            return Ok(false);
        }

        if tables.identity_taken(user, Some(id)) {
            return Err(DomainError::already_exists(
                "username or email already registered",
            ));
        }

        if let Some(existing) = tables.users.get_mut(&id) {
            existing.apply(user.clone(), updated_at);
        }

        Ok(true)
    }

    async fn delete(&self, id: UserId) -> Result<bool, DomainError> {
        self.pause().await;
        let mut tables = self.tables.write().await;

        if !tables.users.contains_key(&id) {
            return Ok(false);
        }

        if tables.loans.values().any(|loan| loan.user_id() == id) {
            return Err(DomainError::validation(format!(
                "user {} is referenced by loans",
                id
            )));
        }

        tables.users.remove(&id);
        Ok(true)
    }
}

#[async_trait]
impl LoanRepository for InMemoryLibraryStore {
    async fn has_open_loan(&self, user_id: UserId, book_id: BookId) -> Result<bool, DomainError> {
        self.pause().await;
        let tables = self.tables.read().await;
        Ok(tables.open_loan_id(user_id, book_id).is_some())
    }

    async fn search(&self, user_id: UserId) -> Result<Vec<Loan>, DomainError> {
        self.pause().await;
        let tables = self.tables.read().await;

        Ok(tables
            .loans
            .values()
            .filter(|loan| loan.user_id() == user_id)
            .cloned()
            .collect())
    }

    async fn borrow_transaction(&self, user: &User, book: &Book) -> Result<Loan, DomainError> {
        self.pause().await;
        let mut tables = self.tables.write().await;

        if !tables.users.contains_key(&user.id()) {
            return Err(DomainError::storage(format!(
                "user {} no longer exists",
                user.id()
            )));
        }

        if tables.open_loan_id(user.id(), book.id()).is_some() {
            return Err(DomainError::return_first(format!(
                "user {} must return book {} first",
                user.id(),
                book.id()
            )));
        }

        let mut stored = tables.stored_book(book.id())?;
        stored.checkout()?;
        self.injected_failure()?;

        let loan_id = tables.next_loan_id()?;
        tables.books.insert(stored.id(), stored);

        let loan = Loan::open(loan_id, LoanKey::from_ids(user.id(), book.id()), Utc::now());
        tables.loans.insert(loan_id, loan.clone());

        Ok(loan)
    }

    async fn return_transaction(&self, user: &User, book: &Book) -> Result<(), DomainError> {
        self.pause().await;
        let mut tables = self.tables.write().await;

        let loan_id = tables.open_loan_id(user.id(), book.id()).ok_or_else(|| {
            DomainError::loan_already_returned(format!(
                "user {} holds no open loan of book {}",
                user.id(),
                book.id()
            ))
        })?;

        let mut stored = tables.stored_book(book.id())?;
        stored.check_in()?;
        self.injected_failure()?;

        if let Some(loan) = tables.loans.get_mut(&loan_id) {
            loan.mark_returned()?;
        }
        tables.books.insert(stored.id(), stored);

        Ok(())
    }
}
