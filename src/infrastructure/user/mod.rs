//! User infrastructure module
//!
//! Password hashing with Argon2, the PostgreSQL repository and the user service.

mod password;
mod postgres_repository;
mod service;

pub use password::{Argon2Hasher, PasswordHasher};
pub use postgres_repository::PostgresUserRepository;
pub use service::{CreateUserRequest, UpdateUserRequest, UserService};
