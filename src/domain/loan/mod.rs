//! Loan domain
//!
//! A loan ties a user to a borrowed book. At most one open loan may exist per
//! (user, book) pair.

mod entity;
mod repository;
mod validation;

pub use entity::{Loan, LoanId, LoanKey};
pub use repository::LoanRepository;
pub use validation::{validate_loan, validate_loan_id, LoanValidationError};

#[cfg(test)]
pub use repository::MockLoanRepository;
