//! Book validation utilities

use thiserror::Error;

/// Errors that can occur during book validation
#[derive(Debug, Error, Clone, PartialEq)]
pub enum BookValidationError {
    #[error("book id should be a positive integer")]
    InvalidId,

    #[error("invalid book: title can't be empty")]
    EmptyTitle,

    #[error("invalid book: author can't be empty")]
    EmptyAuthor,

    #[error("invalid book: amount must be greater than zero")]
    InvalidAmount,
}

/// Validate a book ID
///
/// Ids are assigned by the store and always start at 1.
pub fn validate_book_id(id: i64) -> Result<(), BookValidationError> {
    if id <= 0 {
        return Err(BookValidationError::InvalidId);
    }

    Ok(())
}

/// Validate book attributes as supplied on create or update
///
/// Rules:
/// - Title cannot be empty or whitespace only
/// - Author cannot be empty or whitespace only
/// - Amount must be at least 1 (a book may only drop to 0 by being borrowed)
pub fn validate_book(title: &str, author: &str, amount: i32) -> Result<(), BookValidationError> {
    if title.trim().is_empty() {
        return Err(BookValidationError::EmptyTitle);
    }

    if author.trim().is_empty() {
        return Err(BookValidationError::EmptyAuthor);
    }

    if amount <= 0 {
        return Err(BookValidationError::InvalidAmount);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_book() {
        assert!(validate_book("Let's Go Further!", "Alex Edwards", 5).is_ok());
        assert!(validate_book("Dune", "Frank Herbert", 1).is_ok());
    }

    #[test]
    fn test_empty_fields() {
        assert_eq!(
            validate_book("", "", 5),
            Err(BookValidationError::EmptyTitle)
        );
        assert_eq!(
            validate_book("Dune", "   ", 5),
            Err(BookValidationError::EmptyAuthor)
        );
    }

    #[test]
    fn test_invalid_amount() {
        assert_eq!(
            validate_book("Dune", "Frank Herbert", 0),
            Err(BookValidationError::InvalidAmount)
        );
        assert_eq!(
            validate_book("Dune", "Frank Herbert", -3),
            Err(BookValidationError::InvalidAmount)
        );
    }

    #[test]
    fn test_book_id() {
        assert!(validate_book_id(1).is_ok());
        assert_eq!(validate_book_id(0), Err(BookValidationError::InvalidId));
        assert_eq!(validate_book_id(-1), Err(BookValidationError::InvalidId));
    }
}
