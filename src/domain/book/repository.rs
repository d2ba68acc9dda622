//! Book repository trait

use async_trait::async_trait;
use chrono::{DateTime, Utc};
#[cfg(test)]
use mockall::automock;

use super::entity::{Book, BookDetails, BookId};
use crate::domain::DomainError;

/// Repository trait for book storage
#[cfg_attr(test, automock)]
#[async_trait]
pub trait BookRepository: Send + Sync {
    /// Get a book by its ID
    async fn get(&self, id: BookId) -> Result<Option<Book>, DomainError>;

    /// List every book in store order
    async fn list(&self) -> Result<Vec<Book>, DomainError>;

    /// Books whose title contains `title`, case-insensitively
    async fn search(&self, title: &str) -> Result<Vec<Book>, DomainError>;

    /// Store a new book and return its assigned ID
    async fn create(&self, details: &BookDetails) -> Result<BookId, DomainError>;

    /// Overwrite title, author and stock; `false` when no such book exists
    async fn update(
        &self,
        id: BookId,
        details: &BookDetails,
        updated_at: DateTime<Utc>,
    ) -> Result<bool, DomainError>;

    /// Delete a book; `false` when no such book exists
    async fn delete(&self, id: BookId) -> Result<bool, DomainError>;
}
