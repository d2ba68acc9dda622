//! Book domain
//!
//! Catalogue entries and their available stock.

mod entity;
mod repository;
mod validation;

pub use entity::{Book, BookDetails, BookId};
pub use repository::BookRepository;
pub use validation::{validate_book, validate_book_id, BookValidationError};

#[cfg(test)]
pub use repository::MockBookRepository;
