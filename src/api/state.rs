//! Application state for shared services

use std::sync::Arc;

use crate::domain::book::{Book, BookId, BookRepository};
use crate::domain::loan::{Loan, LoanKey, LoanRepository};
use crate::domain::user::{User, UserId, UserRepository};
use crate::domain::DomainError;
use crate::infrastructure::book::{BookService, CreateBookRequest, UpdateBookRequest};
use crate::infrastructure::loan::LoanService;
use crate::infrastructure::user::{
    CreateUserRequest, PasswordHasher, UpdateUserRequest, UserService,
};

/// Application state containing shared services using dynamic dispatch
#[derive(Clone)]
pub struct AppState {
    pub book_service: Arc<dyn BookServiceTrait>,
    pub user_service: Arc<dyn UserServiceTrait>,
    pub loan_service: Arc<dyn LoanServiceTrait>,
}

/// Trait for book service operations
#[async_trait::async_trait]
pub trait BookServiceTrait: Send + Sync {
    async fn get(&self, id: BookId) -> Result<Book, DomainError>;
    async fn list(&self) -> Result<Vec<Book>, DomainError>;
    async fn search(&self, title: &str) -> Result<Vec<Book>, DomainError>;
    async fn create(&self, request: CreateBookRequest) -> Result<BookId, DomainError>;
    async fn update(&self, id: BookId, request: UpdateBookRequest) -> Result<(), DomainError>;
    async fn delete(&self, id: BookId) -> Result<(), DomainError>;
}

/// Trait for user service operations
#[async_trait::async_trait]
pub trait UserServiceTrait: Send + Sync {
    async fn get(&self, id: UserId) -> Result<User, DomainError>;
    async fn create(&self, request: CreateUserRequest) -> Result<UserId, DomainError>;
    async fn update(&self, id: UserId, request: UpdateUserRequest) -> Result<(), DomainError>;
    async fn delete(&self, id: UserId) -> Result<(), DomainError>;
}

/// Trait for loan service operations
#[async_trait::async_trait]
pub trait LoanServiceTrait: Send + Sync {
    async fn borrow(&self, key: LoanKey) -> Result<(), DomainError>;
    async fn return_book(&self, key: LoanKey) -> Result<(), DomainError>;
    async fn search(&self, user_id: UserId) -> Result<Vec<Loan>, DomainError>;
}

// Implement traits for the actual services

#[async_trait::async_trait]
impl<R: BookRepository + 'static> BookServiceTrait for BookService<R> {
    async fn get(&self, id: BookId) -> Result<Book, DomainError> {
        BookService::get(self, id).await
    }

    async fn list(&self) -> Result<Vec<Book>, DomainError> {
        BookService::list(self).await
    }

    async fn search(&self, title: &str) -> Result<Vec<Book>, DomainError> {
        BookService::search(self, title).await
    }

    async fn create(&self, request: CreateBookRequest) -> Result<BookId, DomainError> {
        BookService::create(self, request).await
    }

    async fn update(&self, id: BookId, request: UpdateBookRequest) -> Result<(), DomainError> {
        BookService::update(self, id, request).await
    }

    async fn delete(&self, id: BookId) -> Result<(), DomainError> {
        BookService::delete(self, id).await
    }
}

#[async_trait::async_trait]
impl<R, H> UserServiceTrait for UserService<R, H>
where
    R: UserRepository + 'static,
    H: PasswordHasher + 'static,
{
    async fn get(&self, id: UserId) -> Result<User, DomainError> {
        UserService::get(self, id).await
    }

    async fn create(&self, request: CreateUserRequest) -> Result<UserId, DomainError> {
        UserService::create(self, request).await
    }

    async fn update(&self, id: UserId, request: UpdateUserRequest) -> Result<(), DomainError> {
        UserService::update(self, id, request).await
    }

    async fn delete(&self, id: UserId) -> Result<(), DomainError> {
        UserService::delete(self, id).await
    }
}

#[async_trait::async_trait]
impl<L, U, B> LoanServiceTrait for LoanService<L, U, B>
where
    L: LoanRepository + 'static,
    U: UserRepository + 'static,
    B: BookRepository + 'static,
{
    async fn borrow(&self, key: LoanKey) -> Result<(), DomainError> {
        LoanService::borrow(self, key).await
    }

    async fn return_book(&self, key: LoanKey) -> Result<(), DomainError> {
        LoanService::return_book(self, key).await
    }

    async fn search(&self, user_id: UserId) -> Result<Vec<Loan>, DomainError> {
        LoanService::search(self, user_id).await
    }
}
