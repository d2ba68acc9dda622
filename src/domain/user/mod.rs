//! User domain
//!
//! This module provides domain types and traits for library members,
//! including user entities, validation, and repository traits.

mod entity;
mod repository;
mod validation;

pub use entity::{NewUser, User, UserDetails, UserId};
pub use repository::UserRepository;
pub use validation::{
    validate_email, validate_password, validate_user, validate_user_id, UserValidationError,
};

#[cfg(test)]
pub use repository::MockUserRepository;
