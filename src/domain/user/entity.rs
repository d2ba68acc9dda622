//! User entity and related types

use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::validation::{validate_user, validate_user_id, UserValidationError};

/// User identifier - positive integer assigned by the store
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "i64")]
pub struct UserId(i64);

impl UserId {
    /// Create a new UserId after validation
    pub fn new(id: i64) -> Result<Self, UserValidationError> {
        validate_user_id(id)?;
        Ok(Self(id))
    }

    pub fn as_i64(&self) -> i64 {
        self.0
    }
}

impl TryFrom<i64> for UserId {
    type Error = UserValidationError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<UserId> for i64 {
    fn from(id: UserId) -> Self {
        id.0
    }
}

impl FromStr for UserId {
    type Err = UserValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let id = s
            .trim()
            .parse::<i64>()
            .map_err(|_| UserValidationError::InvalidId)?;
        Self::new(id)
    }
}

impl std::fmt::Display for UserId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Validated account fields with the password still in plaintext
///
/// Only ever handed to a hasher; stores receive a [`NewUser`].
#[derive(Clone, PartialEq, Eq)]
pub struct UserDetails {
    username: String,
    password: String,
    email: String,
}

impl UserDetails {
    pub fn new(
        username: impl Into<String>,
        password: impl Into<String>,
        email: impl Into<String>,
    ) -> Result<Self, UserValidationError> {
        let username = username.into();
        let password = password.into();
        let email = email.into();
        validate_user(&username, &password, &email)?;

        Ok(Self {
            username,
            password,
            email,
        })
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    pub fn password(&self) -> &str {
        &self.password
    }

    pub fn email(&self) -> &str {
        &self.email
    }

    /// Swap the plaintext password for its hash
    pub fn into_new_user(self, password_hash: impl Into<String>) -> NewUser {
        NewUser {
            username: self.username,
            password_hash: password_hash.into(),
            email: self.email,
        }
    }
}

impl std::fmt::Debug for UserDetails {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UserDetails")
            .field("username", &self.username)
            .field("password", &"[REDACTED]")
            .field("email", &self.email)
            .finish()
    }
}

/// Account fields ready to be persisted
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewUser {
    username: String,
    password_hash: String,
    email: String,
}

impl NewUser {
    pub fn username(&self) -> &str {
        &self.username
    }

    pub fn password_hash(&self) -> &str {
        &self.password_hash
    }

    pub fn email(&self) -> &str {
        &self.email
    }
}

/// Library member
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct User {
    id: UserId,
    username: String,
    /// Argon2 password hash - never exposed in serialization
    #[serde(skip_serializing)]
    password_hash: String,
    email: String,
    created_at: DateTime<Utc>,
    updated_at: Option<DateTime<Utc>>,
}

impl User {
    /// Create a freshly stored user
    pub fn new(id: UserId, fields: NewUser, created_at: DateTime<Utc>) -> Self {
        Self {
            id,
            username: fields.username,
            password_hash: fields.password_hash,
            email: fields.email,
            created_at,
            updated_at: None,
        }
    }

    /// Rebuild a user from stored state
    pub fn restore(
        id: UserId,
        username: impl Into<String>,
        password_hash: impl Into<String>,
        email: impl Into<String>,
        created_at: DateTime<Utc>,
        updated_at: Option<DateTime<Utc>>,
    ) -> Self {
        Self {
            id,
            username: username.into(),
            password_hash: password_hash.into(),
            email: email.into(),
            created_at,
            updated_at,
        }
    }

    // Getters

    pub fn id(&self) -> UserId {
        self.id
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    pub fn password_hash(&self) -> &str {
        &self.password_hash
    }

    pub fn email(&self) -> &str {
        &self.email
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> Option<DateTime<Utc>> {
        self.updated_at
    }

    // Mutators

    /// Replace username, password hash and email
    pub fn apply(&mut self, fields: NewUser, updated_at: DateTime<Utc>) {
        self.username = fields.username;
        self.password_hash = fields.password_hash;
        self.email = fields.email;
        self.updated_at = Some(updated_at);
    }
}
