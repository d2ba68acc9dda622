//! Loan infrastructure module
//!
//! PostgreSQL repository with the borrow and return transactions, and the
//! loan service that drives them.

mod postgres_repository;
mod service;

pub use postgres_repository::PostgresLoanRepository;
pub use service::LoanService;
