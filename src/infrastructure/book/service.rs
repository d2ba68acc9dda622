//! Book service for catalogue management

use std::sync::Arc;

use chrono::Utc;

use crate::domain::book::{Book, BookDetails, BookId, BookRepository};
use crate::domain::{DomainError, ResultExt};

/// Request for creating a new book
#[derive(Debug, Clone)]
pub struct CreateBookRequest {
    pub title: String,
    pub author: String,
    pub amount: i32,
}

/// Request for replacing a book's fields
#[derive(Debug, Clone)]
pub struct UpdateBookRequest {
    pub title: String,
    pub author: String,
    pub amount: i32,
}

/// Book service for catalogue management
pub struct BookService<R: BookRepository> {
    repository: Arc<R>,
}

impl<R: BookRepository> BookService<R> {
    /// Create a new book service
    pub fn new(repository: Arc<R>) -> Self {
        Self { repository }
    }

    /// Get a book by ID
    pub async fn get(&self, id: BookId) -> Result<Book, DomainError> {
        self.repository
            .get(id)
            .await
            .context("get book")?
            .ok_or_else(|| DomainError::book_not_found(format!("book {} not found", id)))
    }

    /// List all books
    pub async fn list(&self) -> Result<Vec<Book>, DomainError> {
        let books = self.repository.list().await.context("list books")?;

        if books.is_empty() {
            return Err(DomainError::book_not_found("no books found"));
        }

        Ok(books)
    }

    /// Books whose title contains `title`
    pub async fn search(&self, title: &str) -> Result<Vec<Book>, DomainError> {
        let books = self
            .repository
            .search(title)
            .await
            .context("search books")?;

        if books.is_empty() {
            return Err(DomainError::book_not_found(format!(
                "no books found matching '{}'",
                title
            )));
        }

        Ok(books)
    }

    /// Create a new book
    pub async fn create(&self, request: CreateBookRequest) -> Result<BookId, DomainError> {
        let details = BookDetails::new(request.title, request.author, request.amount)
            .map_err(|e| DomainError::validation(e.to_string()))?;

        self.repository
            .create(&details)
            .await
            .context("create book")
    }

    /// Replace a book's title, author and stock
    pub async fn update(&self, id: BookId, request: UpdateBookRequest) -> Result<(), DomainError> {
        let details = BookDetails::new(request.title, request.author, request.amount)
            .map_err(|e| DomainError::validation(e.to_string()))?;

        let updated = self
            .repository
            .update(id, &details, Utc::now())
            .await
            .context("update book")?;

        if !updated {
            return Err(DomainError::book_not_found(format!("book {} not found", id)));
        }

        Ok(())
    }

    /// Delete a book
    pub async fn delete(&self, id: BookId) -> Result<(), DomainError> {
        let deleted = self.repository.delete(id).await.context("delete book")?;

        if !deleted {
            return Err(DomainError::book_not_found(format!("book {} not found", id)));
        }

        Ok(())
    }
}
