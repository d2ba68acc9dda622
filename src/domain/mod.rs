//! Domain layer - Core business logic and entities

pub mod book;
pub mod error;
pub mod loan;
pub mod user;

pub use book::{validate_book, validate_book_id, Book, BookDetails, BookId, BookRepository};
pub use error::{DomainError, Entity, ErrorKind, ResultExt};
pub use loan::{Loan, LoanId, LoanKey, LoanRepository};
pub use user::{NewUser, User, UserDetails, UserId, UserRepository};
