//! User repository trait

use async_trait::async_trait;
use chrono::{DateTime, Utc};
#[cfg(test)]
use mockall::automock;

use super::entity::{NewUser, User, UserId};
use crate::domain::DomainError;

/// Repository trait for user storage
///
/// Username and email uniqueness is enforced here and reported as
/// `DomainError::AlreadyExists`.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Get a user by their ID
    async fn get(&self, id: UserId) -> Result<Option<User>, DomainError>;

    /// Store a new user and return the assigned ID
    async fn create(&self, user: &NewUser) -> Result<UserId, DomainError>;

    /// Overwrite username, password hash and email; `false` when no such user exists
    async fn update(
        &self,
        id: UserId,
        user: &NewUser,
        updated_at: DateTime<Utc>,
    ) -> Result<bool, DomainError>;

    /// Delete a user; `false` when no such user exists
    async fn delete(&self, id: UserId) -> Result<bool, DomainError>;
}
