//! Book infrastructure module
//!
//! PostgreSQL repository and the catalogue service.

mod postgres_repository;
mod service;

pub use postgres_repository::PostgresBookRepository;
pub use service::{BookService, CreateBookRequest, UpdateBookRequest};
