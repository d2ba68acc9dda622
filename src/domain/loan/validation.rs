//! Loan validation utilities

use thiserror::Error;

/// Errors that can occur during loan validation
#[derive(Debug, Error, Clone, PartialEq)]
pub enum LoanValidationError {
    #[error("loan id should be a positive integer")]
    InvalidId,

    #[error("user ID and book ID should be positive integers")]
    InvalidLoan,
}

pub fn validate_loan_id(id: i64) -> Result<(), LoanValidationError> {
    if id <= 0 {
        return Err(LoanValidationError::InvalidId);
    }

    Ok(())
}

/// A loan must name both a user and a book
pub fn validate_loan(user_id: i64, book_id: i64) -> Result<(), LoanValidationError> {
    if user_id <= 0 || book_id <= 0 {
        return Err(LoanValidationError::InvalidLoan);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_loan() {
        assert!(validate_loan(1, 1).is_ok());
    }

    #[test]
    fn test_invalid_user_id() {
        assert_eq!(validate_loan(0, 1), Err(LoanValidationError::InvalidLoan));
    }

    #[test]
    fn test_invalid_book_id() {
        assert_eq!(validate_loan(1, 0), Err(LoanValidationError::InvalidLoan));
        assert_eq!(validate_loan(1, -4), Err(LoanValidationError::InvalidLoan));
    }

    #[test]
    fn test_loan_id() {
        assert!(validate_loan_id(3).is_ok());
        assert_eq!(validate_loan_id(0), Err(LoanValidationError::InvalidId));
    }
}
